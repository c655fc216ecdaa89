//! Proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (parts, body, cookie jar)
//!     → resolver.rs (compute destination URL)
//!     → headers.rs (policy copy, hop-by-hop strip, Host override)
//!     → hooks.rs (request transform: trusted headers, body rewrite)
//!     → handler.rs (dispatch via the outbound client)
//!     → hooks.rs (response transform: cookie bookkeeping)
//!     → relay response to the client
//! ```
//!
//! # Design Decisions
//! - The handler is stateless; strategy objects (resolver, transforms)
//!   are injected at construction
//! - Bodies stream through by default; buffering is opt-in and bounded
//! - No retries: delivery is at-most-once, failures surface immediately

pub mod handler;
pub mod headers;
pub mod hooks;
pub mod resolver;

pub use handler::{build_client, ProxyHandler};
pub use hooks::{RequestTransform, ResponseTransform, TenantHeaderInjector, TransformContext};
pub use resolver::{DestinationResolver, PrefixResolver, ResolveError, UpstreamResolver};
