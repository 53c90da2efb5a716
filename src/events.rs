//! # events
//!
//! Defines [`WsEvent`] — every event broadcast to `/ws/monitor` clients.
//!
//! Events are serialized to a JSON `String` before they enter the
//! `tokio::sync::broadcast` channel, which keeps the channel payload `Clone`
//! without dragging domain types along.

use serde::Serialize;

use crate::engine::converter::ConversionState;
use crate::engine::pipeline::RefreshReport;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WsEvent {
    /// A refresh published a new item set.
    ItemsRefreshed {
        report: RefreshReport,
        manual: bool,
    },

    /// A refresh failed; the previous item set is still being served.
    RefreshFailed {
        error: String,
        manual: bool,
    },

    /// The latest conversion request settled.
    ConversionSettled {
        state: ConversionState,
    },
}

impl WsEvent {
    #[inline]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"event":"SERIALIZATION_ERROR"}"#.to_string())
    }
}
