use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;

use super::error::{ApiError, RefreshFailure, SessionExpiredReason};
use super::pending::{PendingRefresh, RefreshOutcome};
use super::request::ApiRequest;
use super::streaming_response::StreamingResponse;
use crate::config::ApiConfig;
use crate::exchange::{ExchangeError, LoginCredentials, TokenExchange};
use crate::models::Session;
use crate::session::{SessionError, SessionStore};
use crate::utils::http_helpers::{is_unauthorized, resolve_url, InvalidUrl};
use crate::utils::log_throttle::should_emit;

const JOIN_LOG_WINDOW: Duration = Duration::from_secs(10);

/// Issues authenticated requests and recovers from an expired access
/// token with one coordinated refresh and one retry.
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    session: Arc<SessionStore>,
    exchange: Arc<dyn TokenExchange>,
    pending: PendingRefresh,
    request_timeout: Duration,
    refresh_timeout_in_ms: u64,
}

impl ApiClient {
    pub fn new(
        config: &ApiConfig,
        session: Arc<SessionStore>,
        exchange: Arc<dyn TokenExchange>,
    ) -> Result<Self, InvalidUrl> {
        let base_url = resolve_url(None, &config.base_url)?;
        info!(
            "Creating ApiClient for '{}' with '{}' token exchange",
            base_url,
            exchange.get_name()
        );
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            session,
            exchange,
            pending: PendingRefresh::new(),
            request_timeout: Duration::from_millis(config.timeout_in_ms),
            refresh_timeout_in_ms: config.refresh_timeout_in_ms,
        })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn refresh_in_flight(&self) -> bool {
        self.pending.is_in_flight()
    }

    /// Runs the login exchange and stores the resulting session.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Session, ApiError> {
        let session = self
            .exchange
            .login(credentials)
            .await
            .map_err(ApiError::Login)?;
        self.session.set(session.clone())?;
        // A refresh started for the previous session must not be joined.
        self.pending.reset();
        info!(
            user_id = ?session.identity().map(|user| user.id.as_str()),
            "Signed in"
        );
        Ok(session)
    }

    pub fn logout(&self) {
        self.session.clear();
        self.pending.reset();
        info!("Signed out");
    }

    /// Executes one logical request.
    ///
    /// Any status other than 401 is returned unchanged, errors included. On
    /// 401 the access token is refreshed (joining a refresh already in
    /// flight) and the request is retried once with the token read back from
    /// the session store.
    ///
    /// # Errors
    ///
    /// [`ApiError::SessionExpired`] when no refresh is possible, the refresh
    /// fails, or the retry is still unauthorized; the session has been
    /// cleared by then. [`ApiError::Transport`] for network failures, with
    /// the session untouched.
    pub async fn request(&self, request: &ApiRequest) -> Result<reqwest::Response, ApiError> {
        let token = self.session.access_token();
        self.request_with(request, token).await
    }

    async fn request_with(
        &self,
        request: &ApiRequest,
        token: Option<String>,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self.send(request, token.as_deref(), true).await?;
        if !is_unauthorized(response.status()) {
            return Ok(response);
        }
        drop(response);

        debug!(
            method = %request.method(),
            target = request.target(),
            "Request unauthorized; recovering session"
        );
        let fresh = self.recover(token.as_deref()).await?;

        let retried = self.send(request, Some(&fresh), true).await?;
        if is_unauthorized(retried.status()) {
            warn!(
                method = %request.method(),
                target = request.target(),
                "Request still unauthorized after refresh; signing out"
            );
            self.session.clear();
            return Err(ApiError::SessionExpired(
                SessionExpiredReason::RejectedAfterRefresh,
            ));
        }
        Ok(retried)
    }

    /// Opens a streaming endpoint with the current credential.
    ///
    /// Streams are not retried: the caller inspects
    /// [`StreamingResponse::status`] before consuming the body.
    pub async fn open_stream(&self, request: &ApiRequest) -> Result<StreamingResponse, ApiError> {
        let token = self.session.access_token();
        let response = self.send(request, token.as_deref(), false).await?;
        debug!(
            status = response.status().as_u16(),
            target = request.target(),
            "Stream opened"
        );
        Ok(StreamingResponse::new(response))
    }

    async fn send(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
        bounded: bool,
    ) -> Result<reqwest::Response, ApiError> {
        let mut built = request.build(&self.http, &self.base_url, token)?;
        if bounded {
            *built.timeout_mut() = Some(self.request_timeout);
        }
        Ok(self.http.execute(built).await?)
    }

    /// Joins or starts the refresh, then reads the access token back from
    /// the session store.
    async fn recover(&self, stale: Option<&str>) -> Result<String, ApiError> {
        // A refresh superseded by a new session is retried once against it.
        for _ in 0..2 {
            let ticket = self
                .pending
                .join_or_start(|| self.start_refresh(stale.map(str::to_string)));
            if !ticket.started {
                if let Some(suppressed_count) =
                    should_emit("client.refresh.join", JOIN_LOG_WINDOW)
                {
                    debug!(
                        event_name = "client.refresh.join",
                        event_domain = "client",
                        suppressed_count,
                        "Joining in-flight token refresh"
                    );
                }
            }

            match ticket.outcome.await {
                Ok(_) => break,
                Err(RefreshFailure::Superseded) => continue,
                Err(failure) => return Err(ApiError::SessionExpired(failure.into())),
            }
        }

        self.session.access_token().ok_or_else(|| {
            ApiError::SessionExpired(SessionExpiredReason::RefreshFailed(
                "session was signed out during refresh".to_string(),
            ))
        })
    }

    /// Builds the refresh future. Called with the pending-refresh lock
    /// held, so the session snapshot cannot race another refresh.
    fn start_refresh(&self, stale: Option<String>) -> BoxFuture<'static, RefreshOutcome> {
        let session = Arc::clone(&self.session);
        let exchange = Arc::clone(&self.exchange);
        let timeout_in_ms = self.refresh_timeout_in_ms;
        let snapshot = session.get();

        async move {
            // A refresh that finished after this request was sent already
            // replaced the token it carried.
            if let Some(current) = snapshot.access_token() {
                if stale.as_deref() != Some(current) {
                    debug!("Access token already replaced; retrying with it");
                    return Ok(current.to_string());
                }
            }

            // Sessions hold both tokens or neither, so there is nothing to clear.
            let Some(refresh_token) = snapshot.refresh_token() else {
                warn!(
                    event_name = "client.refresh.unavailable",
                    event_domain = "client",
                    "No refresh token; sign-in required"
                );
                return Err(RefreshFailure::MissingRefreshToken);
            };

            info!(
                event_name = "client.refresh.start",
                event_domain = "client",
                exchange = exchange.get_name(),
                "Refreshing access token"
            );
            let exchanged = timeout(
                Duration::from_millis(timeout_in_ms),
                exchange.refresh(refresh_token),
            )
            .await
            .unwrap_or(Err(ExchangeError::Timeout {
                operation: "token refresh",
                timeout_in_ms,
            }));

            let grant = match exchanged {
                Ok(grant) => grant,
                Err(e) => {
                    if !session.clear_if_current(refresh_token) {
                        debug!("Refresh for a replaced session failed: {}", e);
                        return Err(RefreshFailure::Superseded);
                    }
                    warn!(
                        event_name = "client.refresh.failed",
                        event_domain = "client",
                        "Token refresh failed; signed out: {}",
                        e
                    );
                    return Err(RefreshFailure::Exchange(e.to_string()));
                }
            };

            match session.apply_refresh(refresh_token, &grant) {
                Ok(()) => {}
                Err(SessionError::Superseded) => {
                    debug!("Session replaced during refresh; discarding the grant");
                    return Err(RefreshFailure::Superseded);
                }
                Err(e) => {
                    warn!(
                        event_name = "client.refresh.not_stored",
                        event_domain = "client",
                        "Refreshed token could not be stored; signing out: {}",
                        e
                    );
                    session.clear_if_current(refresh_token);
                    return Err(RefreshFailure::Session(e.to_string()));
                }
            }

            info!(
                event_name = "client.refresh.succeeded",
                event_domain = "client",
                "Access token refreshed"
            );
            Ok(grant.access_token)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use super::*;
    use crate::models::TokenGrant;
    use crate::storage::{DurableStorage, MemoryStorage};

    struct FakeExchange {
        calls: AtomicUsize,
        exchanged: Mutex<Vec<String>>,
        grant: Option<TokenGrant>,
        gate: Mutex<Option<oneshot::Receiver<()>>>,
    }

    impl FakeExchange {
        fn build(grant: Option<TokenGrant>, gate: Option<oneshot::Receiver<()>>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                exchanged: Mutex::new(Vec::new()),
                grant,
                gate: Mutex::new(gate),
            })
        }

        fn granting(grant: TokenGrant) -> Arc<Self> {
            Self::build(Some(grant), None)
        }

        fn rejecting() -> Arc<Self> {
            Self::build(None, None)
        }

        /// The first refresh waits until the sender fires or is dropped.
        fn gated(grant: TokenGrant) -> (Arc<Self>, oneshot::Sender<()>) {
            let (release, gate) = oneshot::channel();
            (Self::build(Some(grant), Some(gate)), release)
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn exchanged(&self) -> Vec<String> {
            self.exchanged.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TokenExchange for FakeExchange {
        fn get_name(&self) -> &str {
            "fake"
        }

        async fn login(&self, credentials: &LoginCredentials) -> Result<Session, ExchangeError> {
            Ok(Session::authenticated(
                format!("access-for-{}", credentials.email),
                format!("refresh-for-{}", credentials.email),
                None,
            ))
        }

        async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, ExchangeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.exchanged.lock().unwrap().push(refresh_token.to_string());
            let gate = self.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.grant.clone().ok_or(ExchangeError::Rejected {
                operation: "token refresh",
                status: 401,
                detail: "refresh token revoked".to_string(),
            })
        }
    }

    async fn wait_until(condition: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    struct StalledExchange;

    #[async_trait]
    impl TokenExchange for StalledExchange {
        fn get_name(&self) -> &str {
            "stalled"
        }

        async fn login(&self, _credentials: &LoginCredentials) -> Result<Session, ExchangeError> {
            futures::future::pending().await
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<TokenGrant, ExchangeError> {
            futures::future::pending().await
        }
    }

    fn client_for(
        server: &mockito::ServerGuard,
        session: Session,
        exchange: Arc<FakeExchange>,
    ) -> (ApiClient, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = Arc::new(SessionStore::open(storage.clone()));
        store.set(session).unwrap();
        let client = ApiClient::new(&ApiConfig::new(server.url()), store, exchange).unwrap();
        (client, storage)
    }

    #[tokio::test]
    async fn test_non_401_errors_pass_through() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/items")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;
        let exchange = FakeExchange::rejecting();
        let (client, _) = client_for(
            &server,
            Session::authenticated("old", "refresh", None),
            exchange.clone(),
        );

        let response = client.request(&ApiRequest::get("/api/items")).await.unwrap();

        assert_eq!(response.status().as_u16(), 500);
        assert_eq!(exchange.calls(), 0);
        assert!(client.session().has_credentials());
    }

    #[tokio::test]
    async fn test_401_refreshes_and_retries_once() {
        let mut server = mockito::Server::new_async().await;
        let _stale = server
            .mock("GET", "/api/items")
            .match_header("authorization", "Bearer old")
            .with_status(401)
            .create_async()
            .await;
        let fresh = server
            .mock("GET", "/api/items")
            .match_header("authorization", "Bearer new")
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;
        let exchange = FakeExchange::granting(TokenGrant::new("new"));
        let (client, storage) = client_for(
            &server,
            Session::authenticated("old", "refresh", None),
            exchange.clone(),
        );

        let response = client.request(&ApiRequest::get("/api/items")).await.unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.text().await.unwrap(), "[]");
        assert_eq!(exchange.calls(), 1);
        assert_eq!(client.session().access_token().as_deref(), Some("new"));
        assert_eq!(storage.get("accessToken").unwrap().as_deref(), Some("new"));
        assert!(!client.refresh_in_flight());
        fresh.assert_async().await;
    }

    #[tokio::test]
    async fn test_401_without_session_expires_without_exchange() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/items")
            .with_status(401)
            .create_async()
            .await;
        let exchange = FakeExchange::granting(TokenGrant::new("new"));
        let (client, _) = client_for(&server, Session::absent(), exchange.clone());

        let err = client
            .request(&ApiRequest::get("/api/items"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::SessionExpired(SessionExpiredReason::MissingRefreshToken)
        ));
        assert_eq!(exchange.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_session() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/items")
            .with_status(401)
            .create_async()
            .await;
        let exchange = FakeExchange::rejecting();
        let (client, storage) = client_for(
            &server,
            Session::authenticated("old", "refresh", None),
            exchange.clone(),
        );

        let err = client
            .request(&ApiRequest::get("/api/items"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::SessionExpired(SessionExpiredReason::RefreshFailed(_))
        ));
        assert_eq!(exchange.calls(), 1);
        assert_eq!(client.session().get(), Session::absent());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_second_401_signs_out() {
        let mut server = mockito::Server::new_async().await;
        let retried = server
            .mock("GET", "/api/items")
            .with_status(401)
            .expect(2)
            .create_async()
            .await;
        let exchange = FakeExchange::granting(TokenGrant::new("new"));
        let (client, storage) = client_for(
            &server,
            Session::authenticated("old", "refresh", None),
            exchange.clone(),
        );

        let err = client
            .request(&ApiRequest::get("/api/items"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::SessionExpired(SessionExpiredReason::RejectedAfterRefresh)
        ));
        assert_eq!(exchange.calls(), 1);
        assert!(!client.session().has_credentials());
        assert!(storage.is_empty());
        retried.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_and_logout_drive_the_session() {
        let server = mockito::Server::new_async().await;
        let exchange = FakeExchange::rejecting();
        let (client, storage) = client_for(&server, Session::absent(), exchange);

        let session = client
            .login(&LoginCredentials::new("ada@example.com", "secret"))
            .await
            .unwrap();

        assert_eq!(session.access_token(), Some("access-for-ada@example.com"));
        assert_eq!(
            storage.get("refreshToken").unwrap().as_deref(),
            Some("refresh-for-ada@example.com")
        );

        client.logout();
        assert!(!client.session().has_credentials());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_open_stream_does_not_refresh() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/chat")
            .with_status(401)
            .create_async()
            .await;
        let exchange = FakeExchange::granting(TokenGrant::new("new"));
        let (client, _) = client_for(
            &server,
            Session::authenticated("old", "refresh", None),
            exchange.clone(),
        );

        let stream = client
            .open_stream(&ApiRequest::post("/api/chat"))
            .await
            .unwrap();

        assert_eq!(stream.status().as_u16(), 401);
        assert_eq!(exchange.calls(), 0);
        assert_eq!(client.session().access_token().as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_refresh_timeout_expires_session() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/items")
            .with_status(401)
            .create_async()
            .await;
        let storage = Arc::new(MemoryStorage::new());
        let store = Arc::new(SessionStore::open(storage.clone()));
        store
            .set(Session::authenticated("old", "refresh", None))
            .unwrap();
        let config = ApiConfig {
            refresh_timeout_in_ms: 50,
            ..ApiConfig::new(server.url())
        };
        let client = ApiClient::new(&config, store, Arc::new(StalledExchange)).unwrap();

        let err = client
            .request(&ApiRequest::get("/api/items"))
            .await
            .unwrap_err();

        match err {
            ApiError::SessionExpired(SessionExpiredReason::RefreshFailed(detail)) => {
                assert!(detail.contains("timed out after 50ms"), "{}", detail);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_late_401_reuses_completed_refresh() {
        let mut server = mockito::Server::new_async().await;
        let stale = server
            .mock("GET", "/api/items")
            .match_header("authorization", "Bearer old")
            .with_status(401)
            .expect(2)
            .create_async()
            .await;
        let fresh = server
            .mock("GET", "/api/items")
            .match_header("authorization", "Bearer new")
            .with_status(200)
            .expect(2)
            .create_async()
            .await;
        let exchange = FakeExchange::granting(TokenGrant::new("new"));
        let (client, _) = client_for(
            &server,
            Session::authenticated("old", "refresh", None),
            exchange.clone(),
        );
        let request = ApiRequest::get("/api/items");

        client.request(&request).await.unwrap();
        assert_eq!(exchange.calls(), 1);

        // Sent with the old token, answered only after the refresh finished.
        let response = client
            .request_with(&request, Some("old".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(exchange.calls(), 1);
        stale.assert_async().await;
        fresh.assert_async().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_401s_during_held_refresh_share_one_exchange() {
        const REQUESTS: usize = 5;
        let hits = Arc::new(AtomicUsize::new(0));
        let mut server = mockito::Server::new_async().await;
        let stale = server
            .mock("GET", "/api/items")
            .match_header("authorization", "Bearer old")
            .with_status(401)
            .with_body_from_request({
                let hits = hits.clone();
                move |_| {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Vec::new()
                }
            })
            .expect(REQUESTS)
            .create_async()
            .await;
        let fresh = server
            .mock("GET", "/api/items")
            .match_header("authorization", "Bearer new")
            .with_status(200)
            .expect(REQUESTS)
            .create_async()
            .await;
        let (exchange, release) = FakeExchange::gated(TokenGrant::new("new"));
        let (client, _) = client_for(
            &server,
            Session::authenticated("old", "refresh", None),
            exchange.clone(),
        );
        let client = Arc::new(client);

        let tasks: Vec<_> = (0..REQUESTS)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move {
                    client
                        .request(&ApiRequest::get("/api/items"))
                        .await
                        .map(|response| response.status().as_u16())
                })
            })
            .collect();
        wait_until(|| hits.load(Ordering::SeqCst) == REQUESTS).await;
        release.send(()).unwrap();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), 200);
        }
        assert_eq!(exchange.calls(), 1);
        assert_eq!(client.session().access_token().as_deref(), Some("new"));
        stale.assert_async().await;
        fresh.assert_async().await;
    }

    #[tokio::test]
    async fn test_abandoned_refresh_is_not_reused_after_relogin() {
        let mut server = mockito::Server::new_async().await;
        let _stale = server
            .mock("GET", "/api/items")
            .match_header("authorization", "Bearer old")
            .with_status(401)
            .create_async()
            .await;
        let _relogin = server
            .mock("GET", "/api/items")
            .match_header("authorization", "Bearer access-for-ada@example.com")
            .with_status(401)
            .create_async()
            .await;
        let fresh = server
            .mock("GET", "/api/items")
            .match_header("authorization", "Bearer new")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;
        // The first refresh never completes while `_stuck` is alive.
        let (exchange, _stuck) = FakeExchange::gated(TokenGrant::new("new"));
        let (client, _) = client_for(
            &server,
            Session::authenticated("old", "refresh", None),
            exchange.clone(),
        );
        let request = ApiRequest::get("/api/items");

        let cancelled =
            tokio::time::timeout(Duration::from_millis(50), client.request(&request)).await;
        assert!(cancelled.is_err());
        assert!(client.refresh_in_flight());

        client.logout();
        assert!(!client.refresh_in_flight());
        client
            .login(&LoginCredentials::new("ada@example.com", "secret"))
            .await
            .unwrap();

        let response = tokio::time::timeout(Duration::from_secs(5), client.request(&request))
            .await
            .expect("request should not wait on the abandoned refresh")
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(
            exchange.exchanged(),
            vec!["refresh".to_string(), "refresh-for-ada@example.com".to_string()]
        );
        let session = client.session().get();
        assert_eq!(session.access_token(), Some("new"));
        assert_eq!(session.refresh_token(), Some("refresh-for-ada@example.com"));
        fresh.assert_async().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_refresh_outcome_for_replaced_session_is_discarded() {
        let mut server = mockito::Server::new_async().await;
        let _stale = server
            .mock("GET", "/api/items")
            .match_header("authorization", "Bearer old")
            .with_status(401)
            .create_async()
            .await;
        let replaced = server
            .mock("GET", "/api/items")
            .match_header("authorization", "Bearer relogin")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;
        let (exchange, release) = FakeExchange::gated(TokenGrant::new("new"));
        let (client, storage) = client_for(
            &server,
            Session::authenticated("old", "refresh", None),
            exchange.clone(),
        );
        let client = Arc::new(client);

        let task = tokio::spawn({
            let client = client.clone();
            async move { client.request(&ApiRequest::get("/api/items")).await }
        });
        wait_until(|| exchange.calls() == 1).await;
        client
            .session()
            .set(Session::authenticated("relogin", "relogin-refresh", None))
            .unwrap();
        release.send(()).unwrap();

        let response = task.await.unwrap().unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(exchange.calls(), 1);
        assert_eq!(
            client.session().get(),
            Session::authenticated("relogin", "relogin-refresh", None)
        );
        assert_eq!(storage.get("accessToken").unwrap().as_deref(), Some("relogin"));
        replaced.assert_async().await;
    }
}
