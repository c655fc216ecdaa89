//! Session management subsystem.
//!
//! # Data Flow
//! ```text
//! Backend auth response (login / refresh / user / logout)
//!     → session.rs (response hook stages cookie changes)
//!     → cookies.rs (30-day HttpOnly Lax cookies, encoded values)
//!     → Set-Cookie on the relayed response
//!
//! GET /refresh-token
//!     → routes.rs (exchange the refresh cookie for a new access token)
//!
//! Protected page load
//!     → guard.rs (no session cookie → redirect to login)
//!
//! Long-lived client process
//!     → refresh.rs (timer refreshes the access token before expiry)
//! ```

pub mod cookies;
pub mod guard;
pub mod refresh;
pub mod routes;
pub mod session;

pub use refresh::{AccessToken, TokenRefresher};
pub use session::SessionCookieHook;
