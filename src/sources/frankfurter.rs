//! # sources::frankfurter
//!
//! Rate source: `GET {base}?amount=&from=&to=` → `{"rates": {"<TO>": n}}`.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use super::RateSource;
use crate::error::SourceError;

#[derive(Clone)]
pub struct HttpRateSource {
    http: reqwest::Client,
    url: String,
}

impl HttpRateSource {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    #[instrument(skip(self), level = "debug")]
    async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, SourceError> {
        let amount_param = amount.to_string();
        let resp = self
            .http
            .get(&self.url)
            .query(&[("amount", amount_param.as_str()), ("from", from), ("to", to)])
            .send()
            .await
            .map_err(|e| SourceError::Rate(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Rate(format!("rate source returned HTTP {status}")));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| SourceError::Rate(format!("rate response parse error: {e}")))?;

        let converted = parse_rate(&json, to)?;
        debug!(converted, "rate fetched");
        Ok(converted)
    }
}

pub fn parse_rate(json: &Value, to: &str) -> Result<f64, SourceError> {
    json.get("rates")
        .and_then(|rates| rates.get(to))
        .and_then(Value::as_f64)
        .ok_or_else(|| SourceError::Rate(format!("no {to} rate field in response")))
}
