#![allow(dead_code)]

use std::sync::Arc;

use recovery_api::client::ApiClient;
use recovery_api::config::ApiConfig;
use recovery_api::exchange::HttpTokenExchange;
use recovery_api::models::Session;
use recovery_api::session::SessionStore;
use recovery_api::storage::{DurableStorage, MemoryStorage};

pub const TOKEN_JSON: &str = r#"{"access_token": "new"}"#;

pub struct Harness {
    pub client: Arc<ApiClient>,
    pub session: Arc<SessionStore>,
    pub storage: Arc<MemoryStorage>,
}

/// Client, session store and in-memory storage wired against `base_url`,
/// using the real HTTP token exchange.
pub fn harness(base_url: &str, session: Session) -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    let store = Arc::new(SessionStore::open(storage.clone()));
    store.set(session).expect("session stored");

    let config = ApiConfig::new(base_url);
    let exchange = Arc::new(HttpTokenExchange::new(&config).expect("valid exchange config"));
    let client = ApiClient::new(&config, store.clone(), exchange).expect("valid client config");

    Harness {
        client: Arc::new(client),
        session: store,
        storage,
    }
}

pub fn signed_in() -> Session {
    Session::authenticated("old", "r1", None)
}

pub fn stored(storage: &MemoryStorage, key: &str) -> Option<String> {
    storage.get(key).expect("memory storage never fails")
}
