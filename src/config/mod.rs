//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs; the fields the
//!   gateway cannot guess (upstream URL, tenant domain) fail validation
//!   when left empty
//! - Validation separates syntactic (serde) from semantic checks and
//!   reports every error, not just the first

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{default_config, load_config, ConfigError};
pub use schema::GatewayConfig;
pub use schema::{
    AnalyticsRelayConfig, AuthConfig, BodyMode, HeaderPolicy, ListenerConfig,
    ObservabilityConfig, ProxyBehaviorConfig, RedirectMode, RelayConfig, SentryConfig,
    TenantConfig, TimeoutConfig, TlsConfig, UpstreamConfig,
};
