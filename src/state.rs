//! Shared application state.
//!
//! One session store and one client per process; every command works
//! through them.

use std::sync::Arc;

use crate::client::ApiClient;
use crate::config::ConfigV1;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// The session the client reads and recovers.
    pub session: Arc<SessionStore>,
    pub client: Arc<ApiClient>,
}
