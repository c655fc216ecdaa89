//! Configuration schema.
//!
//! The complete TOML structure the gateway accepts. Every section has a
//! `Default` so a minimal config only names what validation requires.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Where the gateway listens, with optional TLS.
    pub listener: ListenerConfig,

    /// Backend API the `/api` prefix proxies to.
    pub upstream: UpstreamConfig,

    /// Tenant identification injected into proxied requests.
    pub tenant: TenantConfig,

    /// Session and token-refresh settings.
    pub auth: AuthConfig,

    /// Forwarding behavior shared by all proxied routes.
    pub proxy: ProxyBehaviorConfig,

    /// Third-party relay routes.
    pub relays: RelayConfig,

    /// Connect/request/idle timeouts.
    pub timeouts: TimeoutConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Where the gateway listens.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Socket address, e.g. "0.0.0.0:8080".
    /// Also settable via the `GATEWAY_BIND` environment variable.
    pub bind_address: String,

    /// Terminate TLS when present; plain HTTP otherwise.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// PEM material for TLS termination.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Certificate chain file.
    pub cert_path: String,

    /// Private key file.
    pub key_path: String,
}

/// Backend API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the backend API (e.g., "https://api.example.com").
    /// Required; also settable via the `BASE_API_URL` environment variable.
    pub base_url: String,

    /// Path prefix routed to the backend. The prefix is kept on the
    /// forwarded path since the backend serves under it.
    pub prefix: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            prefix: "/api".to_string(),
        }
    }
}

/// Tenant identification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TenantConfig {
    /// Tenant domain stamped onto every request forwarded to the backend.
    /// Required; also settable via the `TENANT_DOMAIN` environment variable.
    pub domain: String,

    /// Header the tenant domain is carried in. Client-supplied values for
    /// this header are always overwritten.
    pub header: String,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            header: "x-tenant-domain".to_string(),
        }
    }
}

/// Session and token-refresh configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Backend paths whose successful responses carry session material.
    pub auth_paths: Vec<String>,

    /// Backend path that returns the bare user profile.
    pub user_path: String,

    /// Backend path that ends the session.
    pub logout_path: String,

    /// Backend path tokens are refreshed against.
    pub refresh_path: String,

    /// Where unauthenticated browsers are redirected.
    pub login_path: String,

    /// Path prefixes that require a session cookie. Empty disables the
    /// guard entirely.
    pub protected_prefixes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            auth_paths: vec![
                "/api/accounts/login/".to_string(),
                "/api/accounts/token/refresh/".to_string(),
                "/api/accounts/user/".to_string(),
            ],
            user_path: "/api/accounts/user/".to_string(),
            logout_path: "/api/accounts/logout/".to_string(),
            refresh_path: "/api/accounts/token/refresh/".to_string(),
            login_path: "/account/login".to_string(),
            protected_prefixes: Vec::new(),
        }
    }
}

/// Header-forwarding policy for proxied requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderPolicy {
    /// Forward every header except hop-by-hop ones, then override `Host`.
    ForwardAll,

    /// Forward only a fixed set of innocuous headers.
    Allowlist,
}

/// Redirect handling for proxied requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectMode {
    /// The outbound client resolves 3xx responses itself.
    Follow,

    /// 3xx responses are relayed to the caller with `Location` intact.
    Manual,
}

/// Request-body handling for proxied requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyMode {
    /// Pass the client body through as a byte stream without buffering.
    Stream,

    /// Collect the body in memory before forwarding, enabling body
    /// rewrites at the cost of an upper size bound.
    Buffer,
}

/// Forwarding behavior shared by all proxied routes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyBehaviorConfig {
    /// Which request headers are forwarded.
    pub header_policy: HeaderPolicy,

    /// Whether the gateway follows upstream redirects.
    pub redirect: RedirectMode,

    /// Whether request bodies are streamed or buffered.
    pub body: BodyMode,

    /// Maximum buffered body size in bytes (buffer mode only).
    pub max_buffer_bytes: usize,
}

impl Default for ProxyBehaviorConfig {
    fn default() -> Self {
        Self {
            header_policy: HeaderPolicy::ForwardAll,
            redirect: RedirectMode::Follow,
            body: BodyMode::Stream,
            max_buffer_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Third-party relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Prefix-stripping relays for analytics collectors.
    pub analytics: Vec<AnalyticsRelayConfig>,

    /// Error-envelope relay.
    pub sentry: SentryConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            analytics: vec![
                AnalyticsRelayConfig {
                    name: "mixpanel".to_string(),
                    prefix: "/mixpanel".to_string(),
                    target: "https://api.mixpanel.com".to_string(),
                },
                AnalyticsRelayConfig {
                    name: "ga".to_string(),
                    prefix: "/ga".to_string(),
                    target: "https://www.google-analytics.com".to_string(),
                },
                AnalyticsRelayConfig {
                    name: "posthog".to_string(),
                    prefix: "/posthog".to_string(),
                    target: "https://app.posthog.com".to_string(),
                },
            ],
            sentry: SentryConfig::default(),
        }
    }
}

/// One prefix-stripping analytics relay.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyticsRelayConfig {
    /// Relay identifier for logging/metrics.
    pub name: String,

    /// Inbound path prefix, stripped before forwarding.
    pub prefix: String,

    /// Collector base URL the remainder is appended to.
    pub target: String,
}

/// Error-envelope relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SentryConfig {
    /// Serve the `/sentry` envelope endpoint.
    pub enabled: bool,

    /// Fallback DSN for envelopes whose header carries none.
    /// Also settable via the `SENTRY_DSN` environment variable.
    pub dsn: String,

    /// Ingest host envelopes are forwarded to.
    pub ingest_base: String,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dsn: String::new(),
            ingest_base: "https://sentry.io".to_string(),
        }
    }
}

/// Timeouts applied to outbound requests and the inbound timeout layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Seconds allowed for establishing an upstream connection.
    pub connect_secs: u64,

    /// Seconds allowed for a whole request/response exchange, inbound
    /// and outbound alike.
    pub request_secs: u64,

    /// Seconds a pooled upstream connection may sit idle before closing.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            idle_secs: 60,
        }
    }
}

/// Logging and metrics settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log level when `RUST_LOG` is unset
    /// (trace, debug, info, warn, error).
    pub log_level: String,

    /// Serve the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address the scrape endpoint binds to.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
