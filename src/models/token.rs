use serde::{Deserialize, Serialize};

use super::session::User;

/// Result of a refresh exchange. Providers that rotate refresh tokens
/// return a new one alongside the access token; others return only the
/// access token.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
    #[serde(alias = "accessToken", alias = "token")]
    pub access_token: String,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
}

impl TokenGrant {
    pub fn new(access_token: impl Into<String>) -> Self {
        TokenGrant {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }
}

/// Body returned by the login endpoint.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LoginGrant {
    #[serde(alias = "accessToken", alias = "token")]
    pub access_token: String,
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,
    #[serde(default)]
    pub user: Option<User>,
}
