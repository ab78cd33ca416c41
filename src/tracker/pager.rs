use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{Result, TimelineError};
use crate::models::page::TransactionPage;
use crate::traits::data_provider::ExplorerApi;
use crate::utils::retry::{retry_with_backoff, RetryPolicy};

/// Why pagination ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The endpoint returned no continuation token
    Exhausted,
    /// The endpoint returned a page without items
    EmptyPage,
    /// The configured page cap was reached
    PageCap,
    /// The endpoint handed back the token it was called with
    RepeatedToken,
}

/// Continuation-token pagination over the address transaction list.
///
/// Each call to [`next_page`](Self::next_page) issues at most one list
/// request. Between calls the pager holds only the current token, so a run
/// can be stopped after any page and later resumed with
/// [`resume_from`](Self::resume_from).
pub struct TransactionPager<'a> {
    api: &'a dyn ExplorerApi,
    address: String,
    page_size: usize,
    max_pages: usize,
    delay: Duration,
    retry: RetryPolicy,
    token: Option<String>,
    pages_fetched: usize,
    stopped: Option<StopReason>,
}

impl<'a> TransactionPager<'a> {
    pub fn new(
        api: &'a dyn ExplorerApi,
        address: impl Into<String>,
        page_size: usize,
        max_pages: usize,
        delay: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            api,
            address: address.into(),
            page_size,
            max_pages,
            delay,
            retry,
            token: None,
            pages_fetched: 0,
            stopped: None,
        }
    }

    /// Start from a token saved by an earlier pager
    pub fn resume_from(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Token the next request will carry; `None` before the first page or
    /// after the last one
    pub fn continuation_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stopped
    }

    /// Fetch the next page, or `Ok(None)` once pagination has ended.
    /// A list request that still fails after its retry budget is fatal.
    pub async fn next_page(&mut self) -> Result<Option<TransactionPage>> {
        if self.stopped.is_some() {
            return Ok(None);
        }
        if self.max_pages > 0 && self.pages_fetched >= self.max_pages {
            info!("Reached max pages ({}), stopping", self.max_pages);
            self.stopped = Some(StopReason::PageCap);
            return Ok(None);
        }
        if self.pages_fetched > 0 && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let page_number = self.pages_fetched + 1;
        let label = format!("page {}", page_number);
        let token = self.token.clone();
        let (api, address, page_size) = (self.api, self.address.as_str(), self.page_size);
        let page = retry_with_backoff(self.retry, &label, || {
            api.fetch_transaction_page(address, page_size, token.as_deref())
        })
        .await
        .map_err(|source| TimelineError::Pagination { page: page_number, source })?;

        self.pages_fetched = page_number;
        let next = page.continuation_token.clone();
        debug!(
            "Page {}: {} items, token {}",
            page_number,
            page.item_count,
            if next.is_some() { "present" } else { "none" }
        );

        if page.is_empty() {
            self.stop(StopReason::EmptyPage);
        } else if next.is_none() {
            self.stop(StopReason::Exhausted);
        } else if next == self.token {
            warn!("Endpoint repeated continuation token on page {}, stopping", page_number);
            self.stop(StopReason::RepeatedToken);
        } else {
            self.token = next;
        }

        Ok(Some(page))
    }

    fn stop(&mut self, reason: StopReason) {
        debug!("Pagination finished: {:?}", reason);
        self.token = None;
        self.stopped = Some(reason);
    }
}
