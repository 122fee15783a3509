use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// HTTP client configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Optional upstream HTTP proxy.
    /// TOML: `client.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Minimum spacing between outbound calls, in milliseconds. Zero means the default.
    /// TOML: `client.wait_ms`. Default: `1000`.
    #[serde(default = "default_wait_ms")]
    pub wait_ms: u64,

    /// Per-request timeout in seconds.
    /// TOML: `client.request_timeout_secs`. Default: `120`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Total attempts per logical call, including the first.
    /// TOML: `client.retry_max_times`. Default: `3`.
    #[serde(default = "default_retry_max_times")]
    pub retry_max_times: usize,

    /// Backoff waits in seconds, indexed by backoff round; the last entry repeats.
    /// TOML: `client.backoff_secs`. Default: `[30, 60, 120]`.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: Vec<u64>,

    /// Bearer-token GraphQL host.
    /// TOML: `client.api_url`. Default: `https://api.leonardo.ai/v1/`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Cookie-session web app host (serves `api/auth/session`).
    /// TOML: `client.app_url`. Default: `https://app.leonardo.ai/`.
    #[serde(default = "default_app_url")]
    pub app_url: Url,
}

#[derive(Debug, Clone)]
pub struct ClientResolvedConfig {
    pub proxy: Option<Url>,
    pub wait: Duration,
    pub request_timeout: Duration,
    pub retry_max_times: usize,
    pub backoff: Vec<Duration>,
    pub api_url: Url,
    pub app_url: Url,
}

impl ClientConfig {
    pub fn resolve(&self) -> ClientResolvedConfig {
        let wait_ms = if self.wait_ms == 0 {
            default_wait_ms()
        } else {
            self.wait_ms
        };
        let backoff_secs = if self.backoff_secs.is_empty() {
            default_backoff_secs()
        } else {
            self.backoff_secs.clone()
        };

        ClientResolvedConfig {
            proxy: self.proxy.clone(),
            wait: Duration::from_millis(wait_ms),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            retry_max_times: self.retry_max_times.max(1),
            backoff: backoff_secs.into_iter().map(Duration::from_secs).collect(),
            api_url: with_trailing_slash(&self.api_url),
            app_url: with_trailing_slash(&self.app_url),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            wait_ms: default_wait_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_max_times: default_retry_max_times(),
            backoff_secs: default_backoff_secs(),
            api_url: default_api_url(),
            app_url: default_app_url(),
        }
    }
}

impl Default for ClientResolvedConfig {
    fn default() -> Self {
        ClientConfig::default().resolve()
    }
}

fn with_trailing_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        return url.clone();
    }
    let mut url = url.clone();
    let path = format!("{}/", url.path());
    url.set_path(&path);
    url
}

fn default_wait_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_retry_max_times() -> usize {
    3
}

fn default_backoff_secs() -> Vec<u64> {
    vec![30, 60, 120]
}

fn default_api_url() -> Url {
    Url::parse("https://api.leonardo.ai/v1/").expect("valid fixed api url")
}

fn default_app_url() -> Url {
    Url::parse("https://app.leonardo.ai/").expect("valid fixed app url")
}
