//! Error-envelope relay tests.

mod common;

use axum::http::StatusCode;

use common::{gateway_config, json_ok, spawn_gateway, start_mock_upstream, test_client};

const ENVELOPE_WITH_DSN: &str = concat!(
    r#"{"dsn":"https://abc@o123.ingest.sentry.io/456","sent_at":"2025-01-01T00:00:00Z"}"#,
    "\n",
    r#"{"type":"event"}"#,
    "\n",
    r#"{"message":"boom"}"#,
);

const ENVELOPE_WITHOUT_DSN: &str = concat!(
    r#"{"sent_at":"2025-01-01T00:00:00Z"}"#,
    "\n",
    r#"{"type":"event"}"#,
    "\n",
    r#"{"message":"boom"}"#,
);

#[tokio::test]
async fn test_envelope_routed_by_header_dsn() {
    let ingest = start_mock_upstream(json_ok(r#"{"id":"evt1"}"#)).await;
    let mut config = gateway_config(&ingest);
    config.relays.sentry.ingest_base = ingest.base_url();
    let (base, _shutdown) = spawn_gateway(config).await;

    let response = test_client()
        .post(format!("{base}/sentry"))
        .header("content-type", "application/x-sentry-envelope")
        .body(ENVELOPE_WITH_DSN)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), r#"{"id":"evt1"}"#);

    let seen = &ingest.requests()[0];
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.path, "/api/456/envelope/");
    assert_eq!(
        seen.headers.get("content-type").unwrap(),
        "application/x-sentry-envelope"
    );
    // The envelope is relayed byte for byte.
    assert_eq!(seen.body, ENVELOPE_WITH_DSN.as_bytes());
}

#[tokio::test]
async fn test_envelope_falls_back_to_configured_dsn() {
    let ingest = start_mock_upstream(json_ok("{}")).await;
    let mut config = gateway_config(&ingest);
    config.relays.sentry.ingest_base = ingest.base_url();
    config.relays.sentry.dsn = "https://key@o1.ingest.sentry.io/789".to_string();
    let (base, _shutdown) = spawn_gateway(config).await;

    let response = test_client()
        .post(format!("{base}/sentry"))
        .header("content-type", "application/x-sentry-envelope")
        .body(ENVELOPE_WITHOUT_DSN)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ingest.requests()[0].path, "/api/789/envelope/");
}

#[tokio::test]
async fn test_envelope_without_any_dsn_rejected() {
    let ingest = start_mock_upstream(json_ok("{}")).await;
    let mut config = gateway_config(&ingest);
    config.relays.sentry.ingest_base = ingest.base_url();
    let (base, _shutdown) = spawn_gateway(config).await;

    let response = test_client()
        .post(format!("{base}/sentry"))
        .header("content-type", "application/x-sentry-envelope")
        .body(ENVELOPE_WITHOUT_DSN)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.unwrap(), "Invalid project id or host");
    assert_eq!(ingest.hits(), 0);
}

#[tokio::test]
async fn test_disabled_sentry_route_falls_through_to_404() {
    let ingest = start_mock_upstream(json_ok("{}")).await;
    let mut config = gateway_config(&ingest);
    config.relays.sentry.enabled = false;
    let (base, _shutdown) = spawn_gateway(config).await;

    let response = test_client()
        .post(format!("{base}/sentry"))
        .body(ENVELOPE_WITH_DSN)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(ingest.hits(), 0);
}

#[tokio::test]
async fn test_ingest_status_relayed_verbatim() {
    let ingest = start_mock_upstream(|_| {
        (
            StatusCode::TOO_MANY_REQUESTS,
            axum::http::HeaderMap::new(),
            br#"{"detail":"rate limited"}"#.to_vec(),
        )
    })
    .await;
    let mut config = gateway_config(&ingest);
    config.relays.sentry.ingest_base = ingest.base_url();
    let (base, _shutdown) = spawn_gateway(config).await;

    let response = test_client()
        .post(format!("{base}/sentry"))
        .body(ENVELOPE_WITH_DSN)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        response.text().await.unwrap(),
        r#"{"detail":"rate limited"}"#
    );
}
