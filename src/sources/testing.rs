//! In-memory sources for unit tests. Each mock counts calls and can be
//! switched between success and failure, or slowed down, between refreshes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::{ListingsSource, ProjectionSource, RateSource};
use crate::error::SourceError;
use crate::models::{ItemId, ProjectionTable, RawListing};

pub fn raw(id: ItemId, name: &str, rap: f64, price: f64) -> RawListing {
    RawListing {
        limited_id: Some(json!(id)),
        limited_name: json!(name),
        rap: json!(rap),
        price: json!(price),
    }
}

pub fn signal(projected: i64) -> Vec<Option<i64>> {
    let mut v = vec![Some(0); 7];
    v.push(Some(projected));
    v
}

// ─── Listings ─────────────────────────────────────────────────────────────────

pub struct MockListings {
    pub catalog: Mutex<Result<Vec<RawListing>, String>>,
    pub delay: Mutex<Duration>,
    pub calls: AtomicUsize,
}

impl MockListings {
    pub fn new(catalog: Vec<RawListing>) -> Self {
        Self {
            catalog: Mutex::new(Ok(catalog)),
            delay: Mutex::new(Duration::ZERO),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, catalog: Vec<RawListing>) {
        *self.catalog.lock().unwrap() = Ok(catalog);
    }

    pub fn fail(&self, msg: &str) {
        *self.catalog.lock().unwrap() = Err(msg.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingsSource for MockListings {
    async fn fetch_catalog(&self) -> Result<Vec<RawListing>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.catalog
            .lock()
            .unwrap()
            .clone()
            .map_err(SourceError::Transport)
    }
}

// ─── Projections ──────────────────────────────────────────────────────────────

pub struct MockProjections {
    pub table: Mutex<Result<ProjectionTable, String>>,
}

impl MockProjections {
    pub fn new(table: ProjectionTable) -> Self {
        Self { table: Mutex::new(Ok(table)) }
    }

    pub fn empty() -> Self {
        Self::new(HashMap::new())
    }

    pub fn fail(&self, msg: &str) {
        *self.table.lock().unwrap() = Err(msg.to_string());
    }
}

#[async_trait]
impl ProjectionSource for MockProjections {
    async fn fetch_projections(&self) -> Result<ProjectionTable, SourceError> {
        self.table.lock().unwrap().clone().map_err(SourceError::Format)
    }
}

// ─── Rates ────────────────────────────────────────────────────────────────────

/// Fixed per-target rates, with an optional per-target delay so tests can
/// make an older request finish after a newer one.
pub struct MockRates {
    pub rates: HashMap<String, f64>,
    pub delays: HashMap<String, Duration>,
    pub calls: AtomicUsize,
}

impl MockRates {
    pub fn new(rates: &[(&str, f64)]) -> Self {
        Self {
            rates: rates.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
            delays: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, to: &str, delay: Duration) -> Self {
        self.delays.insert(to.to_string(), delay);
        self
    }
}

#[async_trait]
impl RateSource for MockRates {
    async fn convert(&self, amount: f64, _from: &str, to: &str) -> Result<f64, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(to) {
            tokio::time::sleep(*delay).await;
        }
        self.rates
            .get(to)
            .map(|rate| amount * rate)
            .ok_or_else(|| SourceError::Rate(format!("no {to} rate")))
    }
}
