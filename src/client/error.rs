use crate::exchange::ExchangeError;
use crate::session::SessionError;
use crate::utils::http_helpers::InvalidUrl;

/// Why a session was torn down.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionExpiredReason {
    #[error("no refresh token available")]
    MissingRefreshToken,
    #[error("refresh failed: {0}")]
    RefreshFailed(String),
    #[error("request still unauthorized after refresh")]
    RejectedAfterRefresh,
}

/// Outcome of a failed refresh, shared by every request that joined it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshFailure {
    #[error("no refresh token available")]
    MissingRefreshToken,
    #[error("refresh exchange failed: {0}")]
    Exchange(String),
    #[error("refreshed session could not be stored: {0}")]
    Session(String),
    /// The session was replaced while the refresh ran; its outcome belongs
    /// to the old session and is discarded.
    #[error("session was replaced during refresh")]
    Superseded,
}

impl From<RefreshFailure> for SessionExpiredReason {
    fn from(failure: RefreshFailure) -> Self {
        match failure {
            RefreshFailure::MissingRefreshToken => SessionExpiredReason::MissingRefreshToken,
            other => SessionExpiredReason::RefreshFailed(other.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network failure on an ordinary request. Never retried.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrl),
    #[error("access token cannot be sent as a header")]
    InvalidToken,
    /// The user must log in again. The session has already been cleared.
    #[error("session expired: {0}")]
    SessionExpired(SessionExpiredReason),
    #[error("login failed: {0}")]
    Login(#[source] ExchangeError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired(_))
    }
}
