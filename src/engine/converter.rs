//! # engine::converter
//!
//! **Currency Conversion Lookup** — latest request wins.
//!
//! Every request draws a sequence number from an `AtomicU64`. When a response
//! comes back its number is compared to the latest one *under the state write
//! lock*; only a match is applied. A slow response to an older request can
//! therefore never overwrite the result of a newer one.
//!
//! ```text
//! t0  convert(100 USD→JPY)  id=1  Loading
//! t1  convert(100 USD→EUR)  id=2  Loading
//! t2  id=2 settles          latest=2 → Ready(EUR)
//! t3  id=1 settles          latest=2 → dropped (Superseded)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::sources::RateSource;

/// Currencies offered to pickers. The rate source accepts more; any
/// three-letter code passes validation.
pub const SUPPORTED_CURRENCIES: &[(&str, &str)] = &[
    ("USD", "US Dollar"),
    ("EUR", "Euro"),
    ("GBP", "British Pound"),
    ("JPY", "Japanese Yen"),
    ("AUD", "Australian Dollar"),
    ("CAD", "Canadian Dollar"),
    ("CHF", "Swiss Franc"),
    ("CNY", "Chinese Yuan"),
    ("KRW", "South Korean Won"),
    ("NOK", "Norwegian Krone"),
    ("SGD", "Singapore Dollar"),
    ("HKD", "Hong Kong Dollar"),
];

/// Upper-cased code if `code` is exactly three ASCII letters.
pub fn normalize_currency(code: &str) -> Option<String> {
    let code = code.trim();
    (code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| code.to_ascii_uppercase())
}

// ─── Request / State ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionStatus {
    /// Nothing requested, or the amount was not positive.
    Idle,
    Loading,
    Ready { result: f64 },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionState {
    /// Sequence number of the request this state belongs to.
    pub request_id: u64,
    pub request: Option<ConversionRequest>,
    #[serde(flatten)]
    pub status: ConversionStatus,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Default for ConversionState {
    fn default() -> Self {
        Self {
            request_id: 0,
            request: None,
            status: ConversionStatus::Idle,
            settled_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    /// This request was the latest when it settled; its state is published.
    Applied(ConversionState),
    /// A newer request was issued while this one was in flight.
    Superseded { request_id: u64 },
    /// Amount was not positive: no request sent, result cleared.
    Skipped,
}

// ─── Converter ────────────────────────────────────────────────────────────────

pub struct CurrencyConverter {
    source: Arc<dyn RateSource>,
    latest: AtomicU64,
    state: RwLock<ConversionState>,
}

impl CurrencyConverter {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self {
            source,
            latest: AtomicU64::new(0),
            state: RwLock::new(ConversionState::default()),
        }
    }

    pub async fn state(&self) -> ConversionState {
        self.state.read().await.clone()
    }

    /// Issue a conversion. Any request still in flight becomes stale.
    pub async fn convert(&self, request: ConversionRequest) -> ConversionOutcome {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        // ── 1. Non-positive amount: clear, do not hit the rate source ────────
        if !(request.amount.is_finite() && request.amount > 0.0) {
            let mut state = self.state.write().await;
            if self.is_latest(id) {
                *state = ConversionState {
                    request_id: id,
                    request: Some(request),
                    status: ConversionStatus::Idle,
                    settled_at: None,
                };
            }
            return ConversionOutcome::Skipped;
        }

        // ── 2. Mark loading ──────────────────────────────────────────────────
        {
            let mut state = self.state.write().await;
            if self.is_latest(id) {
                *state = ConversionState {
                    request_id: id,
                    request: Some(request.clone()),
                    status: ConversionStatus::Loading,
                    settled_at: None,
                };
            }
        }

        // ── 3. Ask the rate source ───────────────────────────────────────────
        let result = self
            .source
            .convert(request.amount, &request.from, &request.to)
            .await;

        // ── 4. Apply only if still the latest ────────────────────────────────
        let mut state = self.state.write().await;
        if !self.is_latest(id) {
            debug!(request_id = id, "conversion superseded — result dropped");
            return ConversionOutcome::Superseded { request_id: id };
        }

        let status = match result {
            Ok(converted) => {
                info!(
                    request_id = id,
                    amount = request.amount,
                    from = %request.from,
                    to = %request.to,
                    converted,
                    "conversion settled"
                );
                ConversionStatus::Ready { result: converted }
            }
            Err(err) => {
                warn!(request_id = id, error = %err, "conversion failed");
                ConversionStatus::Failed {
                    error: format!("Failed to fetch exchange rate: {err}"),
                }
            }
        };

        *state = ConversionState {
            request_id: id,
            request: Some(request),
            status,
            settled_at: Some(Utc::now()),
        };

        ConversionOutcome::Applied(state.clone())
    }

    fn is_latest(&self, id: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == id
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
