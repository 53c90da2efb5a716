//! HTTP surface. [`router`] wires every handler plus the CORS and tracing
//! middleware; `main` only binds it.

pub mod convert;
pub mod items;
pub mod monitor;
pub mod proxy;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::SharedState;

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Item table ────────────────────────────────────────────────────────
        .route("/api/items",          get(items::list_items))
        .route("/api/items/:id",      get(items::get_item))
        .route("/api/status",         get(items::get_status))
        .route("/api/refresh",        post(items::trigger_refresh))
        // ── Currency conversion ───────────────────────────────────────────────
        .route("/api/convert",        get(convert::convert))
        .route("/api/convert/latest", get(convert::latest_conversion))
        .route("/api/currencies",     get(convert::list_currencies))
        // ── Passthrough / monitor ─────────────────────────────────────────────
        .route("/rolimon-items",      get(proxy::projection_passthrough))
        .route("/ws/monitor",         get(monitor::ws_monitor))
        // ── Middleware ────────────────────────────────────────────────────────
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
