//! # routes::convert
//!
//! Currency conversion endpoints. Each call to `/api/convert` is a new
//! request to the latest-wins converter; a call that gets overtaken by a newer
//! one answers `409` with whatever the latest state is.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    engine::converter::{
        normalize_currency, ConversionOutcome, ConversionRequest, ConversionStatus,
        SUPPORTED_CURRENCIES,
    },
    error::{AppError, SourceError},
    events::WsEvent,
    state::SharedState,
};

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

// ─── GET /api/convert ─────────────────────────────────────────────────────────

pub async fn convert(
    State(state): State<SharedState>,
    Query(query): Query<ConvertQuery>,
) -> Result<impl IntoResponse, AppError> {
    let from = normalize_currency(&query.from)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid currency code: {:?}", query.from)))?;
    let to = normalize_currency(&query.to)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid currency code: {:?}", query.to)))?;

    let request = ConversionRequest { amount: query.amount, from, to };

    match state.converter.convert(request).await {
        ConversionOutcome::Applied(settled) => {
            state.broadcast(&WsEvent::ConversionSettled { state: settled.clone() });

            if let ConversionStatus::Failed { error } = &settled.status {
                return Err(AppError::Upstream(SourceError::Rate(error.clone())));
            }
            Ok((StatusCode::OK, Json(json!({ "ok": true, "conversion": settled }))))
        }
        ConversionOutcome::Skipped => {
            let latest = state.converter.state().await;
            Ok((StatusCode::OK, Json(json!({ "ok": true, "conversion": latest }))))
        }
        ConversionOutcome::Superseded { request_id } => {
            let latest = state.converter.state().await;
            Ok((
                StatusCode::CONFLICT,
                Json(json!({
                    "ok":         false,
                    "error":      format!("Request {request_id} was superseded by a newer conversion"),
                    "conversion": latest,
                })),
            ))
        }
    }
}

// ─── GET /api/convert/latest ──────────────────────────────────────────────────

pub async fn latest_conversion(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({ "ok": true, "conversion": state.converter.state().await }))
}

// ─── GET /api/currencies ──────────────────────────────────────────────────────

pub async fn list_currencies() -> impl IntoResponse {
    let currencies: Vec<_> = SUPPORTED_CURRENCIES
        .iter()
        .map(|(code, label)| json!({ "code": code, "label": label }))
        .collect();

    Json(json!({ "ok": true, "currencies": currencies }))
}
