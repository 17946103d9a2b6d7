//! HTTP client for the store management API.
//!
//! Wraps `reqwest` with the store's auth headers, envelope unwrapping, and
//! bounded retry on transport failures. Paginated reads live in `paginate.rs`
//! and bulk deletion in `bulk.rs`.

mod bulk;
mod paginate;

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde_json::Value;

use crate::envelope::{read_envelope, Envelope, Meta};
use crate::error::ApiError;
use crate::retry::retry_with_backoff;

pub use paginate::PageFetch;

const DEFAULT_API_ROOT: &str = "https://api.bigcommerce.com/stores/";
const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Page size used by [`ApiClient::delete_all`] when the caller has no
/// preference.
pub const DEFAULT_DELETE_LIMIT: u32 = 3;

/// Flat string-keyed query parameters, form-encoded into the request URL.
pub type Query = BTreeMap<String, String>;

/// Request tuning shared by every call made through one [`ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Additional attempts after a transport failure. `0` disables retries.
    pub max_retries: u32,
    /// Base delay for exponential back-off between transport retries.
    pub backoff_base_ms: u64,
    /// Maximum page fetches in flight during [`ApiClient::get_all`].
    pub page_concurrency: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            max_retries: 3,
            backoff_base_ms: 500,
            page_concurrency: 3,
        }
    }
}

/// Client for one store.
///
/// Use [`ApiClient::new`] for production or [`ApiClient::with_base_url`] to
/// point at a mock server in tests.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    debug: bool,
    settings: ClientSettings,
    last_meta: Mutex<Option<Meta>>,
}

impl ApiClient {
    /// Creates a client for `store_hash` with default [`ClientSettings`].
    ///
    /// # Errors
    ///
    /// See [`ApiClient::with_base_url`].
    pub fn new(store_hash: &str, api_token: &str, debug: bool) -> Result<Self, ApiError> {
        Self::with_settings(store_hash, api_token, debug, ClientSettings::default())
    }

    /// Creates a client for `store_hash` against the production API root.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::with_base_url`].
    pub fn with_settings(
        store_hash: &str,
        api_token: &str,
        debug: bool,
        settings: ClientSettings,
    ) -> Result<Self, ApiError> {
        let base_url = format!("{DEFAULT_API_ROOT}{}/", store_hash.trim_matches('/'));
        Self::with_base_url(&base_url, api_token, debug, settings)
    }

    /// Creates a client with a custom base URL (for wiremock or a proxy).
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidUrl`] if `base_url` does not parse.
    /// - [`ApiError::InvalidHeader`] if `api_token` is not a valid header value.
    /// - [`ApiError::Client`] if the underlying `reqwest::Client` cannot be built.
    pub fn with_base_url(
        base_url: &str,
        api_token: &str,
        debug: bool,
        settings: ClientSettings,
    ) -> Result<Self, ApiError> {
        // The trailing slash keeps `base_url()` stable whether or not the
        // caller wrote one; `build_url` appends segments after it.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ApiError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let mut token =
            HeaderValue::from_str(api_token).map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(AUTH_TOKEN_HEADER), token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout.min(Duration::from_secs(10)))
            .user_agent("storeapi/0.1")
            .default_headers(headers)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url,
            debug,
            settings,
            last_meta: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// The `meta` object of the most recently completed read.
    ///
    /// Concurrent reads (e.g. inside [`ApiClient::get_all`]) overwrite it in
    /// completion order, so it is diagnostic only. Pagination never consults it.
    #[must_use]
    pub fn last_meta(&self) -> Option<Meta> {
        self.last_meta
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetches `endpoint` and returns the envelope's `data`.
    ///
    /// Returns `Ok(None)` when the server sent an empty body.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Request`] on a non-2xx status (never retried).
    /// - [`ApiError::Transport`] once transport retries are exhausted.
    /// - [`ApiError::Parse`] if the body is not a JSON envelope.
    pub async fn get(&self, endpoint: &str, query: &Query) -> Result<Option<Value>, ApiError> {
        self.execute(Method::GET, endpoint, query, None).await
    }

    /// Sends `body` as JSON with POST and returns the envelope's `data`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`].
    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<Option<Value>, ApiError> {
        self.execute(Method::POST, endpoint, &Query::new(), Some(body))
            .await
    }

    /// Sends `body` as JSON with PUT and returns the envelope's `data`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`].
    pub async fn put(&self, endpoint: &str, body: &Value) -> Result<Option<Value>, ApiError> {
        self.execute(Method::PUT, endpoint, &Query::new(), Some(body))
            .await
    }

    /// Issues a DELETE. Any response body is read and discarded.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`].
    pub async fn delete(&self, endpoint: &str, query: &Query) -> Result<(), ApiError> {
        self.execute(Method::DELETE, endpoint, query, None).await?;
        Ok(())
    }

    /// Issues one request and returns the envelope's `data`, or `None` for an
    /// empty body.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`], plus [`ApiError::InvalidUrl`] if `endpoint`
    /// is not a plain path under the store base.
    pub async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<Option<Value>, ApiError> {
        let envelope = self.send(method, endpoint, query, body).await?;
        Ok(envelope.map(|e| e.data))
    }

    /// Sends the request with transport retry, checks the status, and reads
    /// the envelope. Records the envelope's `meta` as the last-seen metadata.
    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<Option<Envelope>, ApiError> {
        let url = self.build_url(endpoint, query)?;
        if self.debug {
            tracing::info!(%method, %url, "store API request");
        } else {
            tracing::debug!(%method, %url, "store API request");
        }

        let raw = retry_with_backoff(
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            || {
                let mut request = self.client.request(method.clone(), url.clone());
                if let Some(body) = body {
                    request = request.json(body);
                }
                async move {
                    let response = request.send().await.map_err(ApiError::Transport)?;
                    let status = response.status();
                    let text = response.text().await.map_err(ApiError::Transport)?;
                    if !status.is_success() {
                        return Err(ApiError::Request {
                            status: status.as_u16(),
                            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
                            body: text,
                        });
                    }
                    Ok(text)
                }
            },
        )
        .await?;

        let envelope = read_envelope(&raw, &format!("{method} {url}"))?;
        if let Some(envelope) = &envelope {
            *self
                .last_meta
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(envelope.meta.clone());
        }
        Ok(envelope)
    }

    /// Appends `endpoint` to the base URL's path and adds the form-encoded
    /// query.
    ///
    /// `endpoint` is a path relative to the store base, never a URL: absolute
    /// URLs, `.`/`..` segments and embedded `?`/`#` are rejected, so the auth
    /// header only ever goes to the store base. A leading `/` is ignored. An
    /// empty query leaves the URL without a `?`.
    fn build_url(&self, endpoint: &str, query: &Query) -> Result<Url, ApiError> {
        let invalid = |reason: &str| ApiError::InvalidUrl {
            url: endpoint.to_owned(),
            reason: reason.to_owned(),
        };
        let path = endpoint.trim_start_matches('/');
        if path.contains("://") || path.contains(['?', '#']) {
            return Err(invalid(
                "endpoint must be a path under the store base; pass parameters as a query",
            ));
        }

        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| invalid("base URL cannot carry a path"))?;
            segments.pop_if_empty();
            for segment in path.split('/') {
                if segment == "." || segment == ".." {
                    return Err(invalid("endpoint may not contain dot segments"));
                }
                segments.push(segment);
            }
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
