//! Domain models shared across the whole limitedwatch service.

pub mod coerce;
pub mod criteria;
pub mod format;
pub mod item;

pub use criteria::{FilterCriteria, SortKey};
pub use item::{Item, ItemId, ProjectionTable, RawListing, NOT_PROJECTED, PROJECTED_SIGNAL_INDEX};
