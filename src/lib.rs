//! Edge Gateway Library
//!
//! Reverse-proxies browser traffic to the backend API and third-party
//! collectors, and owns the session-cookie bookkeeping that goes with it.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod relay;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
