//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check required fields the gateway cannot guess (upstream, tenant)
//! - Validate URLs, addresses, and path prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs once at startup; a request never sees an unvalidated config

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,

    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }

    if config.upstream.base_url.is_empty() {
        errors.push(ValidationError::new(
            "upstream.base_url",
            "required (or set BASE_API_URL)",
        ));
    } else {
        check_http_url(&mut errors, "upstream.base_url", &config.upstream.base_url);
    }
    check_prefix(&mut errors, "upstream.prefix", &config.upstream.prefix);

    if config.tenant.domain.is_empty() {
        errors.push(ValidationError::new(
            "tenant.domain",
            "required (or set TENANT_DOMAIN)",
        ));
    }
    if config.tenant.header.is_empty() {
        errors.push(ValidationError::new("tenant.header", "must not be empty"));
    }

    for (field, path) in [
        ("auth.user_path", &config.auth.user_path),
        ("auth.logout_path", &config.auth.logout_path),
        ("auth.refresh_path", &config.auth.refresh_path),
        ("auth.login_path", &config.auth.login_path),
    ] {
        check_path(&mut errors, field, path);
    }
    for (i, path) in config.auth.auth_paths.iter().enumerate() {
        check_path(&mut errors, &format!("auth.auth_paths[{}]", i), path);
    }
    let mut proxied = vec![config.upstream.prefix.as_str()];
    proxied.extend(config.relays.analytics.iter().map(|r| r.prefix.as_str()));
    for (i, prefix) in config.auth.protected_prefixes.iter().enumerate() {
        let field = format!("auth.protected_prefixes[{}]", i);
        check_prefix(&mut errors, &field, prefix);
        if let Some(shadowed) = proxied.iter().find(|p| prefixes_overlap(prefix, p)) {
            errors.push(ValidationError::new(
                &field,
                format!("would guard proxied traffic under {:?}", shadowed),
            ));
        }
    }

    if config.proxy.max_buffer_bytes == 0 {
        errors.push(ValidationError::new(
            "proxy.max_buffer_bytes",
            "must be greater than zero",
        ));
    }

    let mut seen_prefixes = Vec::new();
    for (i, relay) in config.relays.analytics.iter().enumerate() {
        let field = format!("relays.analytics[{}]", i);
        if relay.name.is_empty() {
            errors.push(ValidationError::new(
                &format!("{}.name", field),
                "must not be empty",
            ));
        }
        check_prefix(&mut errors, &format!("{}.prefix", field), &relay.prefix);
        check_http_url(&mut errors, &format!("{}.target", field), &relay.target);
        if seen_prefixes.contains(&relay.prefix) {
            errors.push(ValidationError::new(
                &format!("{}.prefix", field),
                format!("duplicate prefix {:?}", relay.prefix),
            ));
        }
        seen_prefixes.push(relay.prefix.clone());
    }

    if config.relays.sentry.enabled {
        check_http_url(
            &mut errors,
            "relays.sentry.ingest_base",
            &config.relays.sentry.ingest_base,
        );
        if !config.relays.sentry.dsn.is_empty()
            && crate::relay::sentry::project_id_from_dsn(&config.relays.sentry.dsn).is_none()
        {
            errors.push(ValidationError::new(
                "relays.sentry.dsn",
                "does not carry a project id",
            ));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be greater than zero",
        ));
    }

    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level {:?}", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "not a socket address: {:?}",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme {:?}", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}

fn check_path(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::new(
            field,
            format!("must start with '/': {:?}", value),
        ));
    }
}

fn check_prefix(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if !value.starts_with('/') || value.len() < 2 {
        errors.push(ValidationError::new(
            field,
            format!("must be a non-root path prefix: {:?}", value),
        ));
    } else if value.ends_with('/') {
        errors.push(ValidationError::new(
            field,
            format!("must not end with '/': {:?}", value),
        ));
    }
}

/// Whether one prefix owns the other at a path-segment boundary.
fn prefixes_overlap(a: &str, b: &str) -> bool {
    let owns = |outer: &str, inner: &str| {
        matches!(
            inner.strip_prefix(outer),
            Some(rest) if rest.is_empty() || rest.starts_with('/')
        )
    };
    owns(a, b) || owns(b, a)
}
