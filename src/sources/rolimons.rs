//! # sources::rolimons
//!
//! Projection source. Payload shape:
//!
//! ```json
//! { "success": true, "item_count": 2,
//!   "items": { "1028606": ["Red Baseball Cap", "", 1309, 1309, 1309, -1, -1, -1, -1, -1] } }
//! ```
//!
//! Slot 7 of each vector is the projected signal (`-1` = not projected).

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{get_json, ProjectionSource};
use crate::error::SourceError;
use crate::models::coerce::coerce_i64;
use crate::models::ProjectionTable;

#[derive(Clone)]
pub struct HttpProjectionSource {
    http: reqwest::Client,
    url: String,
}

impl HttpProjectionSource {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }

    /// Raw upstream payload, untouched. Used by the passthrough route.
    pub async fn fetch_raw(&self) -> Result<Value, SourceError> {
        get_json(&self.http, &self.url).await
    }
}

#[async_trait]
impl ProjectionSource for HttpProjectionSource {
    #[instrument(skip(self), fields(url = %self.url), level = "debug")]
    async fn fetch_projections(&self) -> Result<ProjectionTable, SourceError> {
        let json = self.fetch_raw().await?;
        let table = parse_projections(&json)?;
        debug!(count = table.len(), "projection table fetched");
        Ok(table)
    }
}

/// Build the projection table from a payload.
///
/// Keys that are not integer ids and values that are not arrays are skipped;
/// a payload without an `items` object is a format error.
pub fn parse_projections(json: &Value) -> Result<ProjectionTable, SourceError> {
    if json.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(SourceError::Format("projection source reported success=false".into()));
    }

    let items = json
        .get("items")
        .and_then(Value::as_object)
        .ok_or_else(|| SourceError::Format("projection payload has no items object".into()))?;

    let table = items
        .iter()
        .filter_map(|(key, signals)| {
            let id = key.trim().parse().ok()?;
            let vector = signals.as_array()?.iter().map(coerce_i64).collect();
            Some((id, vector))
        })
        .collect();

    Ok(table)
}
