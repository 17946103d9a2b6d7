//! Command handlers. Each maps one subcommand onto one `ApiClient` call.

use std::time::Duration;

use serde_json::Value;
use storeapi_client::{ApiClient, ClientSettings, Query};
use storeapi_core::AppConfig;

use crate::Commands;

pub(crate) fn build_api_client(config: &AppConfig) -> anyhow::Result<ApiClient> {
    let settings = ClientSettings {
        timeout: Duration::from_secs(config.request_timeout_secs),
        max_retries: config.max_retries,
        backoff_base_ms: config.retry_backoff_base_ms,
        page_concurrency: config.page_concurrency,
    };
    let client = match (&config.base_url, &config.store_hash) {
        (Some(base_url), _) => {
            ApiClient::with_base_url(base_url, &config.api_token, config.debug, settings)
        }
        (None, Some(store_hash)) => {
            ApiClient::with_settings(store_hash, &config.api_token, config.debug, settings)
        }
        (None, None) => anyhow::bail!("set STOREAPI_STORE_HASH or STOREAPI_BASE_URL"),
    };
    client.map_err(|e| anyhow::anyhow!("failed to build store API client: {e}"))
}

/// Runs `command` and returns the JSON to print, if any.
pub(crate) async fn run(
    client: &ApiClient,
    config: &AppConfig,
    command: Commands,
) -> anyhow::Result<Option<Value>> {
    let output = match command {
        Commands::Get { endpoint, query } => client.get(&endpoint, &to_query(query)).await?,
        Commands::GetAll { endpoint, query } => {
            let items = client.get_all(&endpoint, &to_query(query)).await?;
            tracing::info!(endpoint, count = items.len(), "fetched collection");
            Some(Value::Array(items))
        }
        Commands::Post { endpoint, body } => client.post(&endpoint, &body).await?,
        Commands::Put { endpoint, body } => client.put(&endpoint, &body).await?,
        Commands::Delete { endpoint, query } => {
            client.delete(&endpoint, &to_query(query)).await?;
            None
        }
        Commands::DeleteAll {
            endpoint,
            query,
            limit,
        } => {
            let limit = limit.unwrap_or(config.delete_limit);
            let deleted = client
                .delete_all(&endpoint, &to_query(query), limit)
                .await?;
            Some(serde_json::json!({ "deleted": deleted }))
        }
    };
    Ok(output)
}

fn to_query(pairs: Vec<(String, String)>) -> Query {
    pairs.into_iter().collect()
}

/// Parses a `key=value` query argument. The value may itself contain `=`.
pub(crate) fn parse_query_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got \"{raw}\""))?;
    if key.is_empty() {
        return Err(format!("empty query key in \"{raw}\""));
    }
    Ok((key.to_owned(), value.to_owned()))
}

pub(crate) fn parse_json_body(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON body: {e}"))
}
