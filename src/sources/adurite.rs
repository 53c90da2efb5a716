//! # sources::adurite
//!
//! Listings source. The catalog lives under `items.items` as an object whose
//! values are listing records:
//!
//! ```json
//! { "items": { "items": {
//!     "8812": { "limited_id": 1028606, "limited_name": "Red Baseball Cap",
//!               "rap": 1309, "price": "4.10" }
//! } } }
//! ```
//!
//! Record order matters: it decides dedup ties and the order a stable sort
//! keeps. Integer-like keys come first in ascending numeric order, then the
//! remaining keys in payload order, the same order a browser client iterates
//! the object in.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{get_json, ListingsSource};
use crate::error::SourceError;
use crate::models::RawListing;

#[derive(Clone)]
pub struct HttpListingsSource {
    http: reqwest::Client,
    url: String,
}

impl HttpListingsSource {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[async_trait]
impl ListingsSource for HttpListingsSource {
    #[instrument(skip(self), fields(url = %self.url), level = "debug")]
    async fn fetch_catalog(&self) -> Result<Vec<RawListing>, SourceError> {
        let json = get_json(&self.http, &self.url).await?;
        let listings = parse_catalog(json)?;
        debug!(count = listings.len(), "listings fetched");
        Ok(listings)
    }
}

/// Extract raw listings from a catalog payload.
///
/// A payload without the `items.items` container is a format error, not an
/// empty catalog. Individual records that do not decode as objects are also a
/// format error: a half-parsed catalog must never be published. Unusable
/// field values (a `null` name or price) are left for normalization to skip.
pub fn parse_catalog(json: Value) -> Result<Vec<RawListing>, SourceError> {
    let container = match json {
        Value::Object(mut root) => root
            .remove("items")
            .and_then(|mut items| items.get_mut("items").map(Value::take)),
        _ => None,
    };

    let records = match container {
        Some(Value::Object(map)) => in_key_order(map),
        Some(Value::Array(list)) => list,
        _ => {
            return Err(SourceError::Format(
                "catalog payload has no items.items collection".into(),
            ))
        }
    };

    records
        .into_iter()
        .map(|record| {
            serde_json::from_value::<RawListing>(record)
                .map_err(|e| SourceError::Format(format!("malformed listing record: {e}")))
        })
        .collect()
}

/// Array-index keys (canonical non-negative integers) ascending, then every
/// other key in insertion order.
fn in_key_order(map: serde_json::Map<String, Value>) -> Vec<Value> {
    let (mut indexed, named): (Vec<_>, Vec<_>) = map
        .into_iter()
        .map(|(key, value)| (array_index(&key), value))
        .partition(|(index, _)| index.is_some());

    // Stable, and indices are unique keys anyway.
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().chain(named).map(|(_, value)| value).collect()
}

fn array_index(key: &str) -> Option<u32> {
    key.parse::<u32>()
        .ok()
        .filter(|n| *n < u32::MAX && n.to_string() == key)
}
