use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Remote API endpoints and request limits.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Overall timeout for ordinary requests. Streaming responses are not
    /// bounded by it once the headers have arrived.
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
    #[serde(default = "default_refresh_timeout_in_ms")]
    pub refresh_timeout_in_ms: u64,
}

fn default_login_path() -> String {
    "/api/auth/login".to_string()
}

fn default_refresh_path() -> String {
    "/api/auth/refresh".to_string()
}

fn default_timeout_in_ms() -> u64 {
    30_000
}

fn default_refresh_timeout_in_ms() -> u64 {
    10_000
}

impl ApiConfig {
    /// A config pointing at `base_url` with every other field defaulted.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            login_path: default_login_path(),
            refresh_path: default_refresh_path(),
            timeout_in_ms: default_timeout_in_ms(),
            refresh_timeout_in_ms: default_refresh_timeout_in_ms(),
        }
    }
}

/// Presentation settings for streamed replies.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct StreamingConfig {
    /// Field holding the text when an endpoint wraps its reply in a JSON envelope.
    #[serde(default = "default_envelope_field")]
    pub envelope_field: String,
}

fn default_envelope_field() -> String {
    "response".to_string()
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            envelope_field: default_envelope_field(),
        }
    }
}
