//! # Limitedwatch — Limited-Item Market Tracker
//!
//! ## Architecture Overview
//!
//! ```text
//!  ┌──────────────┐  fetch_catalog()      ┌───────────────────────────────┐
//!  │  Listings    │ ────────────────────▶ │  ReconciliationPipeline       │
//!  │  (Adurite)   │                       │  normalize → join → dedup     │
//!  └──────────────┘        join           │  RwLock<Arc<Snapshot>>        │
//!  ┌──────────────┐  fetch_projections()  │                               │
//!  │  Projections │ ────────────────────▶ │  ▲ driven by RefreshScheduler │
//!  │  (Rolimons)  │                       └──────────────┬────────────────┘
//!  └──────────────┘                                      │ view(criteria, sort)
//!  ┌──────────────┐  convert()            ┌──────────────▼────────────────┐
//!  │  Rates       │ ◀──────────────────── │  Axum API  /api/*  /ws/monitor│
//!  │ (Frankfurter)│   latest request wins └───────────────────────────────┘
//!  └──────────────┘
//! ```
//!
//! ## Environment Variables
//!
//! | Variable                | Default                                         |
//! |-------------------------|-------------------------------------------------|
//! | `BIND_ADDR`             | `127.0.0.1:5174`                                |
//! | `LISTINGS_URL`          | `https://adurite.com/api/market/roblox`         |
//! | `PROJECTIONS_URL`       | `https://api.rolimons.com/items/v1/itemdetails` |
//! | `RATES_URL`             | `https://api.frankfurter.app/latest`            |
//! | `REFRESH_INTERVAL_SECS` | `60`                                            |
//! | `HTTP_TIMEOUT_SECS`     | `10`                                            |
//! | `HTTP_USER_AGENT`       | `Mozilla/5.0 (limitedwatch)`                    |
//! | `RUST_LOG`              | `limitedwatch=debug`                            |

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod engine;
mod error;
mod events;
mod models;
mod routes;
mod sources;
mod state;

use config::Config;
use state::build_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env (optional — CI/prod can use real env vars) ──────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("limitedwatch=debug".parse()?)
                .add_directive("tower_http=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════╗
  ║        LIMITEDWATCH — Market Tracker          ║
  ║   Listings · Projections · Rates · Monitor    ║
  ╚═══════════════════════════════════════════════╝"#);

    // ── 3. Config + shared state (starts the refresh scheduler) ───────────────
    let config = Config::from_env().context("Failed to load config")?;
    let addr = config.bind_addr;

    info!(
        listings    = %config.listings_url,
        projections = %config.projections_url,
        rates       = %config.rates_url,
        interval    = ?config.refresh_interval,
        "configuration loaded"
    );

    let state = build_state(config)?;

    // ── 4. Router ─────────────────────────────────────────────────────────────
    let app = routes::router(state.clone());

    // ── 5. Bind & serve until Ctrl-C ──────────────────────────────────────────
    info!(?addr, "🚀 Limitedwatch server starting");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    // ── 6. Teardown: no refresh fires or publishes after this point ───────────
    state.scheduler.stop().await;
    info!("shutdown complete");

    Ok(())
}
