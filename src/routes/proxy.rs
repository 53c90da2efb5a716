//! # routes::proxy
//!
//! `GET /rolimon-items` — serves the projection source's JSON verbatim so a
//! browser front end can read it without cross-origin trouble.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::error;

use crate::state::SharedState;

pub async fn projection_passthrough(State(state): State<SharedState>) -> impl IntoResponse {
    match state.projections.fetch_raw().await {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(e) => {
            error!(error = %e, "error fetching projection source");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch Rolimon data" })),
            )
        }
    }
}
