//! Engine: reconciliation, view derivation, refresh scheduling and the
//! currency lookup. Everything here is independent of HTTP.

pub mod converter;
pub mod pipeline;
pub mod reconcile;
pub mod scheduler;
pub mod view;
