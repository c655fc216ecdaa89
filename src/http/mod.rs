//! HTTP edge subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, route dispatch)
//!     → request.rs (stamp x-request-id)
//!     → proxy / auth / relay handlers
//!     → response.rs (failure responses, redirects)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, GatewayServer, ServerError};
