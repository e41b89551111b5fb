//! Library exports for recovery-api, shared between the binary and tests.

pub mod cli;
pub mod client;
pub mod config;
pub mod exchange;
pub mod models;
pub mod session;
pub mod startup;
pub mod state;
pub mod storage;
pub mod streaming;
pub mod utils;
