//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;

use edge_gateway::config::GatewayConfig;
use edge_gateway::lifecycle::Shutdown;
use edge_gateway::GatewayServer;

/// One request captured by the mock upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

type Responder = Arc<dyn Fn(&RecordedRequest) -> (StatusCode, HeaderMap, Vec<u8>) + Send + Sync>;

/// A programmable mock upstream that records everything it receives.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[allow(dead_code)]
impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    respond: Responder,
}

/// Start a mock upstream on an ephemeral port.
pub async fn start_mock_upstream<F>(respond: F) -> MockUpstream
where
    F: Fn(&RecordedRequest) -> (StatusCode, HeaderMap, Vec<u8>) + Send + Sync + 'static,
{
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        requests: requests.clone(),
        respond: Arc::new(respond),
    };

    let app = Router::new()
        .route("/{*path}", any(record))
        .route("/", any(record))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream { addr, requests }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let recorded = RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: body.to_vec(),
    };
    let reply = (state.respond)(&recorded);
    state.requests.lock().unwrap().push(recorded);
    reply
}

/// JSON 200 responder for upstreams whose payload never varies.
#[allow(dead_code)]
pub fn json_ok(body: &str) -> impl Fn(&RecordedRequest) -> (StatusCode, HeaderMap, Vec<u8>) {
    let body = body.to_string();
    move |_| {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        (StatusCode::OK, headers, body.clone().into_bytes())
    }
}

/// Config pointing at a mock upstream, with required fields filled in.
#[allow(dead_code)]
pub fn gateway_config(upstream: &MockUpstream) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.base_url = upstream.base_url();
    config.tenant.domain = "testco.example.com".to_string();
    config.observability.metrics_enabled = false;
    config
}

/// Start the gateway on an ephemeral port; resolves once /healthz answers.
#[allow(dead_code)]
pub async fn spawn_gateway(config: GatewayConfig) -> (String, Shutdown) {
    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let server = GatewayServer::new(config).unwrap();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, receiver).await.unwrap();
    });

    let base = format!("http://{}", addr);
    let probe = test_client();
    for _ in 0..100 {
        if let Ok(response) = probe.get(format!("{base}/healthz")).send().await {
            if response.status() == StatusCode::OK {
                return (base, shutdown);
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("gateway did not become ready");
}

/// Client that relays redirects to the caller instead of following them.
#[allow(dead_code)]
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
