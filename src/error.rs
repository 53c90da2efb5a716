//! # error
//!
//! Two error layers:
//!
//! * [`SourceError`] — what an upstream collaborator (listings, projections,
//!   rates) can fail with. Caught at the pipeline / converter boundary and
//!   turned into a status flag; never fatal.
//! * [`AppError`] — what an HTTP handler returns. Axum's `IntoResponse` impl
//!   converts it into a structured JSON body so clients always get a
//!   machine-readable response even on failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// ─── SourceError ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SourceError {
    /// Network / connection failure, timeout, or a non-success HTTP status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The payload is not in the expected shape (e.g. an HTML error page).
    #[error("format error: {0}")]
    Format(String),

    /// The rate source could not produce a conversion.
    #[error("rate error: {0}")]
    Rate(String),
}

impl SourceError {
    /// Classify a reqwest failure. Body decode failures are format errors,
    /// everything else happened on the wire.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Format(err.to_string())
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

// ─── AppError ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AppError {
    /// The request was syntactically fine but semantically invalid.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The requested resource (e.g. an item id) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An upstream source failed while serving this request.
    #[error("Upstream error: {0}")]
    Upstream(#[from] SourceError),

    /// Catch-all for unexpected failures.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Upstream(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            AppError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {err}"),
            ),
        };

        let body = Json(json!({
            "ok":    false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
