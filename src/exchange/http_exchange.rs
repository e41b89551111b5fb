use std::time::Duration;

use serde_json::json;
use tracing::{debug, info};
use url::Url;

use super::base::{ExchangeError, LoginCredentials, TokenExchange};
use crate::config::ApiConfig;
use crate::models::token::LoginGrant;
use crate::models::{Session, TokenGrant};
use crate::utils::http_helpers::{resolve_url, InvalidUrl};

/// Token exchange against the API's JSON auth endpoints.
pub struct HttpTokenExchange {
    login_url: Url,
    refresh_url: Url,
    http: reqwest::Client,
}

impl HttpTokenExchange {
    /// Builds the exchange from the API config. Fails if the configured
    /// endpoints do not form valid URLs.
    pub fn new(config: &ApiConfig) -> Result<Self, InvalidUrl> {
        let base = resolve_url(None, &config.base_url)?;
        let login_url = resolve_url(Some(&base), &config.login_path)?;
        let refresh_url = resolve_url(Some(&base), &config.refresh_path)?;

        info!(
            "Creating HttpTokenExchange (login='{}', refresh='{}')",
            login_url, refresh_url
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_in_ms))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Ok(Self {
            login_url,
            refresh_url,
            http,
        })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, ExchangeError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_default();
        Err(ExchangeError::Rejected {
            operation,
            status,
            detail,
        })
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<T, ExchangeError> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ExchangeError::Malformed {
            operation,
            detail: e.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl TokenExchange for HttpTokenExchange {
    fn get_name(&self) -> &str {
        "http"
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<Session, ExchangeError> {
        debug!("Exchanging credentials for a session at '{}'", self.login_url);

        let response = self
            .http
            .post(self.login_url.clone())
            .json(credentials)
            .send()
            .await?;

        let response = Self::ensure_success(response, "login").await?;
        let grant: LoginGrant = Self::parse(response, "login").await?;
        Ok(Session::authenticated(
            grant.access_token,
            grant.refresh_token,
            grant.user,
        ))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, ExchangeError> {
        debug!("Exchanging refresh token at '{}'", self.refresh_url);

        let response = self
            .http
            .post(self.refresh_url.clone())
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let response = Self::ensure_success(response, "token refresh").await?;
        Self::parse(response, "token refresh").await
    }
}
