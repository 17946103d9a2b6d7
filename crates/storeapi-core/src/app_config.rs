#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for talking to one store.
///
/// `api_token` is a store credential and is redacted from the `Debug` output.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Required unless `base_url` is set.
    pub store_hash: Option<String>,
    pub api_token: String,
    /// Overrides the `https://api.bigcommerce.com/stores/<hash>/` base when set.
    pub base_url: Option<String>,
    pub debug: bool,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub page_concurrency: usize,
    pub delete_limit: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("store_hash", &self.store_hash)
            .field("api_token", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("debug", &self.debug)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("page_concurrency", &self.page_concurrency)
            .field("delete_limit", &self.delete_limit)
            .finish()
    }
}
