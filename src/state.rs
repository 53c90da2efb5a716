//! # state
//!
//! The shared application state injected into every Axum handler.
//!
//! * `pipeline`   — published item snapshot + refresh status (written only by
//!   the scheduler task)
//! * `scheduler`  — control handle: manual reload, runtime counter, teardown
//! * `converter`  — latest-wins currency lookup, independent of the pipeline
//! * `broadcast_tx` — pre-serialized [`WsEvent`] JSON for `/ws/monitor`

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::engine::converter::CurrencyConverter;
use crate::engine::pipeline::ReconciliationPipeline;
use crate::engine::scheduler::{self, SchedulerHandle};
use crate::events::WsEvent;
use crate::sources::{
    HttpListingsSource, HttpProjectionSource, HttpRateSource, ListingsSource, ProjectionSource,
    RateSource,
};

/// Capacity of the monitor broadcast channel. Slow clients lag, never block.
const EVENT_BUFFER: usize = 256;

pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<ReconciliationPipeline>,
    pub scheduler: SchedulerHandle,
    pub converter: Arc<CurrencyConverter>,
    /// Used by the passthrough route to serve the projection payload verbatim.
    pub projections: Arc<HttpProjectionSource>,
    pub broadcast_tx: broadcast::Sender<String>,
}

impl AppState {
    /// Wire sources, pipeline, converter and start the refresh scheduler.
    /// Must be called inside a Tokio runtime.
    pub fn new(
        config: Config,
        listings: Arc<dyn ListingsSource>,
        projection_source: Arc<dyn ProjectionSource>,
        rates: Arc<dyn RateSource>,
        projections: Arc<HttpProjectionSource>,
    ) -> Self {
        let (broadcast_tx, _) = broadcast::channel(EVENT_BUFFER);
        let pipeline = Arc::new(ReconciliationPipeline::new(listings, projection_source));
        let scheduler = scheduler::spawn(
            Arc::clone(&pipeline),
            config.refresh_interval,
            broadcast_tx.clone(),
        );

        Self {
            config: Arc::new(config),
            pipeline,
            scheduler,
            converter: Arc::new(CurrencyConverter::new(rates)),
            projections,
            broadcast_tx,
        }
    }

    /// Broadcast to every monitor client. No listeners is not an error.
    pub fn broadcast(&self, event: &WsEvent) {
        let _ = self.broadcast_tx.send(event.to_json());
    }
}

pub type SharedState = Arc<AppState>;

/// Production wiring: HTTP sources over one shared client.
pub fn build_state(config: Config) -> anyhow::Result<SharedState> {
    let http = config.http_client()?;

    let listings = Arc::new(HttpListingsSource::new(http.clone(), config.listings_url.clone()));
    let projections = Arc::new(HttpProjectionSource::new(http.clone(), config.projections_url.clone()));
    let rates = Arc::new(HttpRateSource::new(http, config.rates_url.clone()));

    Ok(Arc::new(AppState::new(
        config,
        listings,
        projections.clone(),
        rates,
        projections,
    )))
}
