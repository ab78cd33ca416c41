use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::page::TransactionPage;

/// Upstream explorer API used by the timeline pipeline
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    /// Fetch one page of the address transaction list
    async fn fetch_transaction_page(
        &self,
        address: &str,
        limit: usize,
        continuation_token: Option<&str>,
    ) -> Result<TransactionPage, ApiError>;

    /// Fetch the detail payload for a transaction hash
    async fn fetch_transaction_detail(&self, hash: &str) -> Result<Value, ApiError>;

    /// Fetch the current balance; `None` when the response carries no balance
    async fn fetch_balance(&self, address: &str) -> Result<Option<Decimal>, ApiError>;
}
