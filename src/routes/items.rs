//! # routes::items
//!
//! Axum handlers for the item table and the refresh controls.
//!
//! ## Endpoints
//!
//! | Method | Path              | Description                                    |
//! |--------|-------------------|------------------------------------------------|
//! | GET    | `/api/items`      | Filtered + sorted view of the published items  |
//! | GET    | `/api/items/:id`  | One item (detail view)                         |
//! | GET    | `/api/status`     | Refresh phase, stale flag, runtime counter     |
//! | POST   | `/api/refresh`    | Manual reload                                  |

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    engine::view::view,
    error::AppError,
    models::{
        format::{format_runtime, format_value},
        FilterCriteria, Item, ItemId, SortKey,
    },
    state::SharedState,
};

// ─── Query / Row ──────────────────────────────────────────────────────────────

/// Query string of `GET /api/items`. Missing fields fall back to the
/// dashboard defaults (`0 ≤ value ≤ 1M`, `rate ≤ 4.5`, no search, rate order).
#[derive(Debug, Default, Deserialize)]
pub struct ItemsQuery {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub max_rate: Option<f64>,
    pub search: Option<String>,
    pub sort: Option<SortKey>,
}

impl ItemsQuery {
    fn into_criteria(self) -> Result<(FilterCriteria, SortKey), AppError> {
        let defaults = FilterCriteria::default();
        let criteria = FilterCriteria {
            min_value: self.min_value.unwrap_or(defaults.min_value),
            max_value: self.max_value.unwrap_or(defaults.max_value),
            max_rate: self.max_rate.unwrap_or(defaults.max_rate),
            search_text: self.search.unwrap_or_default(),
        };

        for (name, v) in [
            ("min_value", criteria.min_value),
            ("max_value", criteria.max_value),
            ("max_rate", criteria.max_rate),
        ] {
            if v.is_nan() {
                return Err(AppError::BadRequest(format!("{name} must be a number")));
            }
        }

        Ok((criteria, self.sort.unwrap_or_default()))
    }
}

/// One table row. Rate is derived here, never stored on the item.
#[derive(Debug, Serialize)]
pub struct ItemRow {
    pub id: ItemId,
    pub name: String,
    pub reference_value: f64,
    pub value_display: String,
    pub ask_price: f64,
    pub cost_display: String,
    pub rate: f64,
    pub projected: bool,
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            reference_value: item.reference_value,
            value_display: format_value(item.reference_value),
            ask_price: item.ask_price,
            cost_display: format!("${:.2}", item.ask_price),
            rate: round2(item.rate()),
            projected: item.projected(),
        }
    }
}

fn round2(n: f64) -> f64 {
    if n.is_finite() {
        (n * 100.0).round() / 100.0
    } else {
        n
    }
}

// ─── GET /api/items ───────────────────────────────────────────────────────────

pub async fn list_items(
    State(state): State<SharedState>,
    Query(query): Query<ItemsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (criteria, sort) = query.into_criteria()?;
    let snapshot = state.pipeline.snapshot().await;

    let rows: Vec<ItemRow> = view(&snapshot.items, &criteria, sort)
        .iter()
        .map(ItemRow::from)
        .collect();

    Ok(Json(json!({
        "ok":           true,
        "count":        rows.len(),
        "total":        snapshot.items.len(),
        "stale":        snapshot.is_stale(),
        "error":        snapshot.last_error.as_ref().map(|_| "Could not fetch data"),
        "generation":   snapshot.generation,
        "refreshed_at": snapshot.refreshed_at,
        "criteria":     criteria,
        "sort":         sort,
        "items":        rows,
    })))
}

// ─── GET /api/items/:id ───────────────────────────────────────────────────────

pub async fn get_item(
    State(state): State<SharedState>,
    Path(id): Path<ItemId>,
) -> Result<impl IntoResponse, AppError> {
    let item = state
        .pipeline
        .find(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No item with id {id} in the current catalog")))?;

    Ok(Json(json!({
        "ok":           true,
        "item":         ItemRow::from(&item),
        "is_projected": item.is_projected,
    })))
}

// ─── GET /api/status ──────────────────────────────────────────────────────────

pub async fn get_status(State(state): State<SharedState>) -> impl IntoResponse {
    Json(status_json(&state).await)
}

/// Status body, shared with the monitor snapshot frame.
pub async fn status_json(state: &SharedState) -> Value {
    let snapshot = state.pipeline.snapshot().await;
    let runtime = state.scheduler.runtime_secs();

    json!({
        "ok":                    true,
        "phase":                 snapshot.phase,
        "stale":                 snapshot.is_stale(),
        "error":                 snapshot.last_error,
        "generation":            snapshot.generation,
        "item_count":            snapshot.items.len(),
        "refreshed_at":          snapshot.refreshed_at,
        "last_attempt_at":       snapshot.last_attempt_at,
        "runtime_secs":          runtime,
        "runtime_display":       format_runtime(runtime),
        "refresh_interval_secs": state.config.refresh_interval.as_secs(),
    })
}

// ─── POST /api/refresh ────────────────────────────────────────────────────────

pub async fn trigger_refresh(State(state): State<SharedState>) -> impl IntoResponse {
    let queued = state.scheduler.trigger_reload();
    info!(queued, "manual reload requested");

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "ok":      true,
            "queued":  queued,
            "message": if queued { "Reload queued." } else { "Reload already pending." },
        })),
    )
}
