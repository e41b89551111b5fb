//! The resilient request wrapper: the only sanctioned way to issue an
//! authenticated request.

#[allow(clippy::module_inception)]
pub mod client;
pub mod error;
pub mod pending;
pub mod request;
pub mod streaming_response;

pub use client::ApiClient;
pub use error::{ApiError, RefreshFailure, SessionExpiredReason};
pub use pending::PendingRefresh;
pub use request::ApiRequest;
pub use streaming_response::StreamingResponse;
