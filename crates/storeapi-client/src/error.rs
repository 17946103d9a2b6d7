use thiserror::Error;

/// Errors returned by [`ApiClient`](crate::ApiClient).
#[derive(Debug, Error)]
pub enum ApiError {
    /// No HTTP response was received (connect failure, timeout, broken body)
    /// after every retry attempt was used.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-2xx status. Never retried.
    #[error("request failed: {status} {status_text}: {body}")]
    Request {
        status: u16,
        status_text: String,
        body: String,
    },

    /// A non-empty response body is not a JSON envelope.
    #[error("JSON deserialization error for {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A page response carried `data` that is neither an array nor null.
    #[error("expected an array of records from {endpoint}, got {found}")]
    UnexpectedPayload { endpoint: String, found: String },

    /// A record fetched for bulk deletion has no usable `id`.
    #[error("record from {endpoint} has no id")]
    MissingId { endpoint: String },

    /// A record that was already deleted came back in a later page.
    #[error("bulk delete on {endpoint} made no progress: id {id} returned after deletion")]
    DeleteStalled { endpoint: String, id: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    /// The underlying `reqwest::Client` could not be built.
    #[error("HTTP client construction failed: {0}")]
    Client(#[source] reqwest::Error),
}
