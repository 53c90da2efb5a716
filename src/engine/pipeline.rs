//! # engine::pipeline
//!
//! **Reconciliation Pipeline** — owns the published item set.
//!
//! ## Refresh flow
//!
//! ```text
//! fetch():   ┌─ listings.fetch_catalog() ───────┐
//!            │                                  ├─ join ─▶ reconcile() ─▶ PendingRefresh
//!            └─ projections.fetch_projections() ┘
//! apply():   Ok  → swap in a new Snapshot (items + generation + cleared error)
//!            Err → swap in a new Snapshot (same items, error set)
//! ```
//!
//! ## Publication
//!
//! The whole [`Snapshot`] lives behind one `RwLock<Arc<Snapshot>>`. Writers
//! build the next snapshot off to the side and swap the `Arc` under the write
//! lock, so a reader holds either the pre- or the post-refresh snapshot and
//! never a mix. The scheduler is the only caller of `fetch`/`apply`, which
//! keeps writes single-file.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::engine::reconcile::{reconcile, Reconciled};
use crate::error::SourceError;
use crate::models::{Item, ItemId};
use crate::sources::{ListingsSource, ProjectionSource};

// ─── Snapshot ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefreshPhase {
    #[default]
    Idle,
    Refreshing,
}

/// Everything a reader may look at, published as one unit.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Last good item set. Shared, never mutated after publication.
    pub items: Arc<Vec<Item>>,
    /// Number of successful publishes so far. 0 = nothing fetched yet.
    pub generation: u64,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub phase: RefreshPhase,
    /// Set by a failed refresh, cleared by the next successful one.
    pub last_error: Option<String>,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// `true` while the items on display are older than the latest attempt.
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }

    pub fn find(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Outcome of a successful refresh, for logs and the monitor stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshReport {
    pub cycle_id: Uuid,
    pub generation: u64,
    pub raw_count: usize,
    pub skipped: usize,
    pub item_count: usize,
    pub projected_count: usize,
    pub duration_ms: u64,
}

/// Fetched-and-reconciled data that has not been published yet.
#[derive(Debug)]
pub struct PendingRefresh {
    cycle_id: Uuid,
    started: Instant,
    outcome: Result<Reconciled, SourceError>,
}

impl PendingRefresh {
    #[cfg(test)]
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

// ─── Pipeline ─────────────────────────────────────────────────────────────────

pub struct ReconciliationPipeline {
    listings: Arc<dyn ListingsSource>,
    projections: Arc<dyn ProjectionSource>,
    published: RwLock<Arc<Snapshot>>,
}

impl ReconciliationPipeline {
    pub fn new(listings: Arc<dyn ListingsSource>, projections: Arc<dyn ProjectionSource>) -> Self {
        Self {
            listings,
            projections,
            published: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    /// Current published snapshot. Cheap: clones an `Arc`.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.published.read().await)
    }

    pub async fn find(&self, id: ItemId) -> Option<Item> {
        self.snapshot().await.find(id).cloned()
    }

    /// Fetch, reconcile and publish in one go. The scheduler splits this in
    /// two so it can drop a result that lands after teardown.
    #[cfg(test)]
    pub async fn refresh(&self) -> Result<RefreshReport, SourceError> {
        let pending = self.fetch().await;
        self.apply(pending).await
    }

    /// Run both source requests concurrently and reconcile once both settle.
    /// Marks the pipeline as refreshing; nothing is published yet.
    pub async fn fetch(&self) -> PendingRefresh {
        let cycle_id = Uuid::new_v4();
        let started = Instant::now();
        let span = info_span!("refresh", cycle_id = %cycle_id);

        self.update(|snap| {
            snap.phase = RefreshPhase::Refreshing;
            snap.last_attempt_at = Some(Utc::now());
        })
        .await;

        let outcome = async {
            // ── 1. Join both sources: wait for both, fail if either fails ────
            let (catalog, projections) = tokio::join!(
                self.listings.fetch_catalog(),
                self.projections.fetch_projections(),
            );

            // ── 2. Normalize → join → dedup ──────────────────────────────────
            Ok::<_, SourceError>(reconcile(catalog?, &projections?))
        }
        .instrument(span)
        .await;

        PendingRefresh { cycle_id, started, outcome }
    }

    /// Publish a pending refresh. On failure the previous items stay in place
    /// and the error flag is raised.
    pub async fn apply(&self, pending: PendingRefresh) -> Result<RefreshReport, SourceError> {
        let PendingRefresh { cycle_id, started, outcome } = pending;
        let duration_ms = elapsed_ms(started.elapsed());

        let reconciled = match outcome {
            Ok(reconciled) => reconciled,
            Err(err) => {
                let message = err.to_string();
                self.update(|snap| {
                    snap.phase = RefreshPhase::Idle;
                    snap.last_error = Some(message);
                })
                .await;

                warn!(%cycle_id, error = %err, duration_ms, "refresh failed — keeping previous items");
                return Err(err);
            }
        };

        let projected_count = reconciled.items.iter().filter(|i| i.projected()).count();
        let item_count = reconciled.items.len();
        let items = Arc::new(reconciled.items);

        let generation = {
            let mut guard = self.published.write().await;
            let next = Snapshot {
                items,
                generation: guard.generation + 1,
                refreshed_at: Some(Utc::now()),
                phase: RefreshPhase::Idle,
                last_error: None,
                last_attempt_at: guard.last_attempt_at,
            };
            let generation = next.generation;
            *guard = Arc::new(next);
            generation
        };

        let report = RefreshReport {
            cycle_id,
            generation,
            raw_count: reconciled.raw_count,
            skipped: reconciled.skipped,
            item_count,
            projected_count,
            duration_ms,
        };

        info!(
            %cycle_id,
            generation,
            raw_count  = report.raw_count,
            item_count,
            projected_count,
            duration_ms,
            "item set published"
        );

        Ok(report)
    }

    /// Drop a pending refresh without publishing anything.
    pub async fn abandon(&self, pending: PendingRefresh) {
        self.update(|snap| snap.phase = RefreshPhase::Idle).await;
        info!(cycle_id = %pending.cycle_id, "refresh result discarded");
    }

    async fn update(&self, f: impl FnOnce(&mut Snapshot)) {
        let mut guard = self.published.write().await;
        let mut next = Snapshot::clone(&guard);
        f(&mut next);
        *guard = Arc::new(next);
    }
}

fn elapsed_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectionTable;
    use crate::sources::testing::{raw, signal, MockListings, MockProjections};

    fn pipeline(listings: Arc<MockListings>, projections: Arc<MockProjections>) -> ReconciliationPipeline {
        ReconciliationPipeline::new(listings, projections)
    }

    #[tokio::test]
    async fn test_refresh_publishes_reconciled_set() {
        let mut table = ProjectionTable::new();
        table.insert(42, signal(1));
        let listings = Arc::new(MockListings::new(vec![
            raw(1, "A", 1000.0, 5.0),
            raw(1, "A", 1000.0, 3.0),
            raw(42, "Dominus", 2000.0, 8.0),
        ]));
        let p = pipeline(listings, Arc::new(MockProjections::new(table)));

        let report = p.refresh().await.unwrap();
        assert_eq!(report.generation, 1);
        assert_eq!(report.raw_count, 3);
        assert_eq!(report.item_count, 2);
        assert_eq!(report.projected_count, 1);

        let snap = p.snapshot().await;
        assert_eq!(snap.items.len(), 2);
        assert_eq!(snap.find(1).unwrap().ask_price, 3.0);
        assert_eq!(snap.find(42).unwrap().is_projected, Some(true));
        assert_eq!(snap.phase, RefreshPhase::Idle);
        assert!(!snap.is_stale());
    }

    #[tokio::test]
    async fn test_listings_failure_keeps_previous_set() {
        let listings = Arc::new(MockListings::new(vec![raw(1, "A", 1000.0, 5.0)]));
        let p = pipeline(listings.clone(), Arc::new(MockProjections::empty()));
        p.refresh().await.unwrap();
        let before = p.snapshot().await;

        listings.fail("connection reset");
        let err = p.refresh().await.unwrap_err();
        assert!(matches!(err, SourceError::Transport(_)));

        let after = p.snapshot().await;
        assert!(Arc::ptr_eq(&before.items, &after.items));
        assert_eq!(after.generation, 1);
        assert!(after.is_stale());
        assert_eq!(after.phase, RefreshPhase::Idle);
    }

    #[tokio::test]
    async fn test_projection_failure_never_publishes_partial_merge() {
        let listings = Arc::new(MockListings::new(vec![raw(1, "A", 1000.0, 5.0)]));
        let projections = Arc::new(MockProjections::empty());
        projections.fail("<html>bad gateway</html>");
        let p = pipeline(listings, projections);

        let err = p.refresh().await.unwrap_err();
        assert!(matches!(err, SourceError::Format(_)));

        let snap = p.snapshot().await;
        assert!(snap.items.is_empty());
        assert_eq!(snap.generation, 0);
        assert!(snap.is_stale());
    }

    #[tokio::test]
    async fn test_error_cleared_by_next_success() {
        let listings = Arc::new(MockListings::new(vec![]));
        listings.fail("timeout");
        let p = pipeline(listings.clone(), Arc::new(MockProjections::empty()));

        assert!(p.refresh().await.is_err());
        assert!(p.snapshot().await.is_stale());

        listings.set(vec![raw(7, "Fedora", 500.0, 1.0)]);
        p.refresh().await.unwrap();

        let snap = p.snapshot().await;
        assert!(!snap.is_stale());
        assert_eq!(snap.items.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_readers_mid_refresh_see_previous_snapshot() {
        let listings = Arc::new(MockListings::new(vec![raw(1, "old", 1000.0, 1.0)]));
        let p = Arc::new(pipeline(listings.clone(), Arc::new(MockProjections::empty())));
        p.refresh().await.unwrap();

        listings.set(vec![raw(2, "new", 1000.0, 1.0), raw(3, "new", 1000.0, 1.0)]);
        listings.set_delay(Duration::from_secs(5));

        let task = {
            let p = Arc::clone(&p);
            tokio::spawn(async move { p.refresh().await })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        let mid = p.snapshot().await;
        assert_eq!(mid.phase, RefreshPhase::Refreshing);
        assert_eq!(mid.items.len(), 1);
        assert_eq!(mid.items[0].name, "old");

        task.await.unwrap().unwrap();
        let done = p.snapshot().await;
        assert_eq!(done.items.len(), 2);
        assert_eq!(done.generation, 2);
    }

    #[tokio::test]
    async fn test_abandon_publishes_nothing() {
        let listings = Arc::new(MockListings::new(vec![raw(1, "A", 1000.0, 1.0)]));
        let p = pipeline(listings, Arc::new(MockProjections::empty()));

        let pending = p.fetch().await;
        assert!(pending.is_ok());
        assert_eq!(p.snapshot().await.phase, RefreshPhase::Refreshing);

        p.abandon(pending).await;
        let snap = p.snapshot().await;
        assert_eq!(snap.phase, RefreshPhase::Idle);
        assert!(snap.items.is_empty());
        assert_eq!(snap.generation, 0);
    }
}
