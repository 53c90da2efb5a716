//! # sources
//!
//! The three upstream collaborators, each behind a trait so the pipeline and
//! the converter can be exercised without a network:
//!
//! | Trait              | HTTP implementation      | Upstream            |
//! |--------------------|--------------------------|---------------------|
//! | [`ListingsSource`]   | [`HttpListingsSource`]   | Adurite market      |
//! | [`ProjectionSource`] | [`HttpProjectionSource`] | Rolimons item details |
//! | [`RateSource`]       | [`HttpRateSource`]       | Frankfurter rates   |

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SourceError;
use crate::models::{ProjectionTable, RawListing};

pub mod adurite;
pub mod frankfurter;
pub mod rolimons;

#[cfg(test)]
pub mod testing;

pub use adurite::HttpListingsSource;
pub use frankfurter::HttpRateSource;
pub use rolimons::HttpProjectionSource;

// ─── Contracts ────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ListingsSource: Send + Sync {
    /// Full current catalog, one raw record per listing (duplicates included).
    async fn fetch_catalog(&self) -> Result<Vec<RawListing>, SourceError>;
}

#[async_trait]
pub trait ProjectionSource: Send + Sync {
    /// Full projection table keyed by item id.
    async fn fetch_projections(&self) -> Result<ProjectionTable, SourceError>;
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Convert `amount` of `from` into `to`.
    async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, SourceError>;
}

// ─── Shared HTTP helper ───────────────────────────────────────────────────────

/// GET `url` and parse the body as JSON.
///
/// The body is read as text first so an HTML error page served with a 200
/// shows up as a [`SourceError::Format`] instead of a confusing decode error.
pub(crate) async fn get_json(client: &reqwest::Client, url: &str) -> Result<Value, SourceError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(SourceError::from_reqwest)?;

    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::Transport(format!("{url} returned HTTP {status}")));
    }

    let body = resp.text().await.map_err(SourceError::from_reqwest)?;
    parse_json_body(&body)
}

pub(crate) fn parse_json_body(body: &str) -> Result<Value, SourceError> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(64).collect();
        SourceError::Format(format!("response is not JSON ({e}): {preview:?}"))
    })
}
