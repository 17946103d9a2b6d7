//! Page-number pagination for list endpoints.

use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Method;
use serde_json::Value;

use crate::envelope::{Page, Pagination};
use crate::error::ApiError;

use super::{ApiClient, Query};

/// A pending fetch of one page, as produced by [`ApiClient::paginate`].
pub type PageFetch<'a> = BoxFuture<'a, Result<Page, ApiError>>;

impl ApiClient {
    /// Fetches a single page of `endpoint` with `query` as given.
    ///
    /// # Errors
    ///
    /// Propagates any error from the request, plus
    /// [`ApiError::UnexpectedPayload`] when `data` is not an array.
    pub async fn get_page(&self, endpoint: &str, query: &Query) -> Result<Page, ApiError> {
        let envelope = self.send(Method::GET, endpoint, query, None).await?;
        let page = Page::from_envelope(endpoint, envelope)?;
        if let Some(pagination) = &page.pagination {
            self.log_page(endpoint, pagination);
        }
        Ok(page)
    }

    /// Fetches the first page of `endpoint`, then yields one pending fetch per
    /// page.
    ///
    /// Entries come in page-index order; the first one is already resolved.
    /// Later entries copy `query` with `page` set to their index. The page
    /// range comes from the first page's own metadata, so it stays fixed
    /// however the later fetches complete.
    ///
    /// Fetches are lazy: the iterator creates each boxed future only when it
    /// is pulled, and nothing is sent for a page until its future is polled.
    /// A caller that wants every page in flight at once must pull and poll
    /// them itself; [`ApiClient::get_all`] pulls through a bounded window
    /// instead, so a collection with thousands of pages never holds more than
    /// `page_concurrency` pending fetches.
    ///
    /// A response without pagination metadata counts as a single page.
    ///
    /// # Errors
    ///
    /// Propagates any error from fetching the first page.
    pub async fn paginate<'a>(
        &'a self,
        endpoint: &'a str,
        query: &Query,
    ) -> Result<impl Iterator<Item = PageFetch<'a>> + Send + 'a, ApiError> {
        let first = self.get_page(endpoint, query).await?;
        let (current_page, total_pages) = first
            .pagination
            .map_or((1, 1), |p| (p.current_page.max(1), p.total_pages));

        let query = query.clone();
        let later = (current_page.saturating_add(1)..=total_pages).map(move |page| {
            let mut page_query = query.clone();
            page_query.insert("page".to_owned(), page.to_string());
            async move { self.get_page(endpoint, &page_query).await }.boxed()
        });
        Ok(std::iter::once(future::ready(Ok(first)).boxed()).chain(later))
    }

    /// Fetches every page of `endpoint` and concatenates the records in page
    /// order.
    ///
    /// At most `page_concurrency` page requests are in flight at once.
    /// Completion order does not affect the result order.
    ///
    /// **All-or-nothing**: the first failing page aborts the whole call and
    /// records from pages that already succeeded are dropped.
    ///
    /// # Errors
    ///
    /// Propagates the first error from any page fetch.
    pub async fn get_all(&self, endpoint: &str, query: &Query) -> Result<Vec<Value>, ApiError> {
        let fetches = self.paginate(endpoint, query).await?;
        let pages: Vec<Page> = stream::iter(fetches)
            .buffered(self.settings.page_concurrency.max(1))
            .try_collect()
            .await?;
        Ok(pages.into_iter().flat_map(|page| page.items).collect())
    }

    fn log_page(&self, endpoint: &str, pagination: &Pagination) {
        let current = pagination.current_page;
        let total = pagination.total_pages;
        if self.debug {
            tracing::info!(endpoint, current, total, "fetched page");
        } else {
            tracing::debug!(endpoint, current, total, "fetched page");
        }
    }
}
