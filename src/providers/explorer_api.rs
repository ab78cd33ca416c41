use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::models::page::TransactionPage;
use crate::traits::data_provider::ExplorerApi;
use crate::utils::helper::{get_ci, parse_decimal};

pub const DEFAULT_BASE_URL: &str = "https://api.idena.io/api";

/// Per-endpoint request timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTimeouts {
    pub list_ms: u64,
    pub detail_ms: u64,
    pub balance_ms: u64,
}

impl Default for ApiTimeouts {
    fn default() -> Self {
        Self {
            list_ms: 30_000,
            detail_ms: 20_000,
            balance_ms: 20_000,
        }
    }
}

/// Idena explorer REST client
pub struct IdenaApi {
    client: Client,
    base_url: String,
    timeouts: ApiTimeouts,
}

impl IdenaApi {
    /// Create a new explorer client
    pub fn new(base_url: impl Into<String>, timeouts: ApiTimeouts) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("balance-timeline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Permanent(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeouts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout_ms: u64,
    ) -> Result<Value, ApiError> {
        debug!("GET {} {:?}", url, query);
        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await?;

        if let Some(err) = classify_status(response.status(), url) {
            return Err(err);
        }
        Ok(response.json::<Value>().await?)
    }
}

/// Map a non-success status to the error it stands for; `None` on success.
/// 404 is final, 429 and 5xx are retried, every other failure is permanent.
pub fn classify_status(status: StatusCode, url: &str) -> Option<ApiError> {
    if status.is_success() {
        None
    } else if status == StatusCode::NOT_FOUND {
        Some(ApiError::NotFound)
    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Some(ApiError::Transient(format!("{} returned {}", url, status)))
    } else {
        Some(ApiError::Permanent(format!("{} returned {}", url, status)))
    }
}

#[async_trait]
impl ExplorerApi for IdenaApi {
    async fn fetch_transaction_page(
        &self,
        address: &str,
        limit: usize,
        continuation_token: Option<&str>,
    ) -> Result<TransactionPage, ApiError> {
        let url = format!("{}/Address/{}/Txs", self.base_url, address);
        let mut query = vec![("limit", limit.to_string())];
        if let Some(token) = continuation_token {
            query.push(("continuationToken", token.to_string()));
        }
        let payload = self.get_json(&url, &query, self.timeouts.list_ms).await?;
        Ok(TransactionPage::from_payload(&payload))
    }

    async fn fetch_transaction_detail(&self, hash: &str) -> Result<Value, ApiError> {
        let url = format!("{}/Transaction/{}", self.base_url, hash);
        let payload = self.get_json(&url, &[], self.timeouts.detail_ms).await?;
        Ok(unwrap_result(payload))
    }

    async fn fetch_balance(&self, address: &str) -> Result<Option<Decimal>, ApiError> {
        let url = format!("{}/Address/{}", self.base_url, address);
        let payload = self.get_json(&url, &[], self.timeouts.balance_ms).await?;
        Ok(extract_balance(&payload))
    }
}

/// Detail responses may wrap the transaction in `result`
pub fn unwrap_result(payload: Value) -> Value {
    match payload {
        Value::Object(mut obj) => {
            let key = obj
                .iter()
                .find(|(k, v)| k.eq_ignore_ascii_case("result") && v.is_object())
                .map(|(k, _)| k.clone());
            match key.and_then(|k| obj.remove(&k)) {
                Some(inner) => inner,
                None => Value::Object(obj),
            }
        }
        other => other,
    }
}

/// Read `balance` from the top level, `result` or `data`
pub fn extract_balance(payload: &Value) -> Option<Decimal> {
    get_ci(payload, &["balance"])
        .or_else(|| get_ci(payload, &["result"]).and_then(|r| get_ci(r, &["balance"])))
        .or_else(|| get_ci(payload, &["data"]).and_then(|d| get_ci(d, &["balance"])))
        .filter(|v| !v.is_null())
        .map(|v| parse_decimal(Some(v)))
}
