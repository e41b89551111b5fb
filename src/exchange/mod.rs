pub mod base;
pub mod http_exchange;

pub use base::{ExchangeError, LoginCredentials, TokenExchange};
pub use http_exchange::HttpTokenExchange;
