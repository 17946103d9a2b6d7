//! Delete-until-empty over a filtered collection.

use std::collections::HashSet;

use futures::future::try_join_all;
use serde_json::Value;

use crate::error::ApiError;

use super::{ApiClient, Query};

impl ApiClient {
    /// Deletes every record of `endpoint` matching `query`.
    ///
    /// Repeatedly fetches one page of up to `limit` records, deletes them all
    /// concurrently via `DELETE {endpoint}/{id}`, and fetches the same query
    /// again until it comes back empty. Returns the number of records deleted.
    ///
    /// The server must drop deleted records from later results of the same
    /// query. If a record that was already deleted shows up again the loop
    /// stops with [`ApiError::DeleteStalled`] instead of spinning forever.
    ///
    /// A failed delete aborts the current round: the remaining deletes of that
    /// round are dropped and the error is returned. A `limit` of 0 is treated
    /// as 1.
    ///
    /// # Errors
    ///
    /// - Any error from fetching a page or deleting a record.
    /// - [`ApiError::MissingId`] if a fetched record has no `id`.
    /// - [`ApiError::DeleteStalled`] if deleted records are returned again.
    pub async fn delete_all(
        &self,
        endpoint: &str,
        query: &Query,
        limit: u32,
    ) -> Result<usize, ApiError> {
        let mut page_query = query.clone();
        page_query.insert("limit".to_owned(), limit.max(1).to_string());

        let base = endpoint.trim_end_matches('/');
        let mut deleted_ids: HashSet<String> = HashSet::new();
        let mut deleted = 0usize;
        let mut round = 0u32;

        loop {
            let page = self.get_page(endpoint, &page_query).await?;
            if page.items.is_empty() {
                break;
            }
            round += 1;

            let ids = page
                .items
                .iter()
                .map(|item| record_id(endpoint, item))
                .collect::<Result<Vec<_>, _>>()?;

            if let Some(id) = ids.iter().find(|id| deleted_ids.contains(*id)) {
                return Err(ApiError::DeleteStalled {
                    endpoint: endpoint.to_owned(),
                    id: id.clone(),
                });
            }

            if self.debug {
                tracing::info!(endpoint, round, count = ids.len(), "deleting batch");
            } else {
                tracing::debug!(endpoint, round, count = ids.len(), "deleting batch");
            }

            try_join_all(ids.iter().map(|id| {
                let path = format!("{base}/{id}");
                async move { self.delete(&path, &Query::new()).await }
            }))
            .await?;

            deleted += ids.len();
            deleted_ids.extend(ids);
        }

        tracing::info!(endpoint, deleted, rounds = round, "bulk delete complete");
        Ok(deleted)
    }
}

/// Extracts a record's `id` as a path segment. Numeric and string ids are
/// both accepted.
fn record_id(endpoint: &str, item: &Value) -> Result<String, ApiError> {
    match item.get("id") {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(ApiError::MissingId {
            endpoint: endpoint.to_owned(),
        }),
    }
}
