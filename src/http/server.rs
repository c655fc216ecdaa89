//! HTTP server assembly and request dispatch.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → RequestIdLayer (stamp x-request-id)
//!     → TimeoutLayer / TraceLayer
//!     → session guard (protected prefixes redirect to login)
//!     → fixed routes (/healthz, /refresh-token, /sentry)
//!     → dispatch: longest-owning prefix wins
//!         relay prefix  → relay ProxyHandler (prefix stripped)
//!         upstream path → backend ProxyHandler (prefix kept)
//!         otherwise     → 404
//! ```
//!
//! # Design Decisions
//! - One shared outbound client; every handler borrows its pool
//! - Handlers are built once at startup from validated config, so
//!   per-request dispatch is a prefix scan over a small fixed table

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::Router;
use axum_extra::extract::CookieJar;
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::auth::{guard, routes as auth_routes, SessionCookieHook};
use crate::config::{GatewayConfig, TlsConfig};
use crate::http::request::RequestIdLayer;
use crate::lifecycle::signals::wait_for_shutdown;
use crate::observability::metrics;
use crate::proxy::{build_client, ProxyHandler, TenantHeaderInjector, UpstreamResolver};
use crate::relay::{build_relays, sentry, RelayRoute};

/// Errors raised while assembling the server from config.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to build the outbound client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid tenant header: {0}")]
    TenantHeader(#[from] axum::http::Error),

    #[error("Invalid refresh endpoint: {0}")]
    RefreshEndpoint(#[from] url::ParseError),
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub client: reqwest::Client,
    pub backend: Arc<ProxyHandler>,
    pub relays: Arc<Vec<RelayRoute>>,
    pub refresh_endpoint: Url,
}

/// The assembled gateway, ready to serve.
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    /// Build every handler from a validated config.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let client = build_client(&config.proxy, &config.timeouts)?;

        let tenant = TenantHeaderInjector::new(&config.tenant.header, &config.tenant.domain)?;
        let session = SessionCookieHook::new(&config.auth);
        let resolver = Arc::new(UpstreamResolver::new(&config.upstream.base_url));
        let backend = Arc::new(
            ProxyHandler::new(resolver, client.clone(), &config.proxy, "backend")
                .with_request_transform(Arc::new(tenant))
                .with_response_transform(Arc::new(session)),
        );

        let relays = Arc::new(build_relays(&config, &client));

        let refresh_endpoint = Url::parse(&format!(
            "{}{}",
            config.upstream.base_url.trim_end_matches('/'),
            config.auth.refresh_path
        ))?;

        let state = AppState {
            config: Arc::new(config),
            client,
            backend,
            relays,
            refresh_endpoint,
        };

        Ok(Self {
            router: build_router(state),
        })
    }

    /// Serve plain HTTP until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await
    }

    /// Serve HTTPS until the shutdown signal fires. In-flight requests get
    /// 30 seconds to drain.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: &TlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let rustls = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;

        let handle = axum_server::Handle::new();
        let watcher = handle.clone();
        tokio::spawn(async move {
            wait_for_shutdown(shutdown).await;
            watcher.graceful_shutdown(Some(Duration::from_secs(30)));
        });

        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await
    }
}

fn build_router(state: AppState) -> Router {
    let request_secs = state.config.timeouts.request_secs;

    let mut router = Router::new()
        .route("/healthz", get(health))
        .route("/refresh-token", get(auth_routes::refresh_token));

    if state.config.relays.sentry.enabled {
        router = router.route("/sentry", post(sentry::relay_envelope));
    }

    router
        .route("/{*path}", any(dispatch))
        .route("/", any(dispatch))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::require_session,
        ))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(request_secs)))
        .layer(RequestIdLayer)
        .layer(TraceLayer::new_for_http())
}

/// Hand the request to whichever proxy handler owns its path prefix.
async fn dispatch(State(state): State<AppState>, jar: CookieJar, request: Request) -> Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();
    let path = parts.uri.path().to_string();

    let handler = state
        .relays
        .iter()
        .find(|relay| relay.matches(&path))
        .map(|relay| Arc::clone(&relay.handler))
        .or_else(|| {
            owns_path(&state.config.upstream.prefix, &path).then(|| Arc::clone(&state.backend))
        });

    match handler {
        Some(handler) => handler.forward(parts, body, jar).await.into_response(),
        None => {
            tracing::warn!(path = %path, method = %parts.method, "No matching route found");
            metrics::record_request(parts.method.as_str(), 404, "none", start);
            (StatusCode::NOT_FOUND, "No matching route found").into_response()
        }
    }
}

fn owns_path(prefix: &str, path: &str) -> bool {
    matches!(
        path.strip_prefix(prefix),
        Some(rest) if rest.is_empty() || rest.starts_with('/')
    )
}

async fn health() -> &'static str {
    "ok"
}
