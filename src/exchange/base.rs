use crate::models::{Session, TokenGrant};

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{operation} rejected with status {status}: {detail}")]
    Rejected {
        operation: &'static str,
        status: u16,
        detail: String,
    },
    #[error("{operation} returned an unusable body: {detail}")]
    Malformed {
        operation: &'static str,
        detail: String,
    },
    #[error("{operation} timed out after {timeout_in_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_in_ms: u64,
    },
}

/// User-supplied login credentials.
#[derive(Clone, serde::Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The login and refresh exchanges the session lifecycle depends on.
#[async_trait::async_trait]
pub trait TokenExchange: Send + Sync {
    /// A descriptive name for the exchange (for logs/debug).
    fn get_name(&self) -> &str;

    /// Trades user credentials for a full session.
    async fn login(&self, credentials: &LoginCredentials) -> Result<Session, ExchangeError>;

    /// Trades a refresh token for a new access token, and possibly a
    /// rotated refresh token.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, ExchangeError>;
}
