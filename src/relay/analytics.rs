//! Prefix relays for analytics collectors.

use std::sync::Arc;

use crate::config::schema::GatewayConfig;
use crate::proxy::handler::ProxyHandler;
use crate::proxy::resolver::PrefixResolver;

/// One mounted relay: a path prefix and the handler that serves it.
pub struct RelayRoute {
    pub name: String,
    pub prefix: String,
    pub handler: Arc<ProxyHandler>,
}

impl RelayRoute {
    /// Whether a request path belongs to this relay.
    pub fn matches(&self, path: &str) -> bool {
        matches!(
            path.strip_prefix(self.prefix.as_str()),
            Some(rest) if rest.is_empty() || rest.starts_with('/')
        )
    }
}

/// Build the relay table from configuration.
pub fn build_relays(config: &GatewayConfig, client: &reqwest::Client) -> Vec<RelayRoute> {
    config
        .relays
        .analytics
        .iter()
        .map(|relay| {
            let resolver = Arc::new(PrefixResolver::new(&relay.prefix, &relay.target));
            let handler =
                ProxyHandler::new(resolver, client.clone(), &config.proxy, relay.name.clone());
            RelayRoute {
                name: relay.name.clone(),
                prefix: relay.prefix.clone(),
                handler: Arc::new(handler),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ProxyBehaviorConfig;
    use crate::proxy::handler::build_client;

    fn route(prefix: &str) -> RelayRoute {
        let behavior = ProxyBehaviorConfig::default();
        let client = build_client(&behavior, &Default::default()).unwrap();
        RelayRoute {
            name: "test".to_string(),
            prefix: prefix.to_string(),
            handler: Arc::new(ProxyHandler::new(
                Arc::new(PrefixResolver::new(prefix, "https://collector.test")),
                client,
                &behavior,
                "test",
            )),
        }
    }

    #[test]
    fn test_matches_exact_and_nested_paths() {
        let relay = route("/mixpanel");
        assert!(relay.matches("/mixpanel"));
        assert!(relay.matches("/mixpanel/track"));
        assert!(!relay.matches("/mixpanelista"));
        assert!(!relay.matches("/ga/collect"));
    }

    #[test]
    fn test_default_config_builds_three_relays() {
        let config = GatewayConfig::default();
        let client = build_client(&config.proxy, &config.timeouts).unwrap();
        let relays = build_relays(&config, &client);
        let names: Vec<_> = relays.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["mixpanel", "ga", "posthog"]);
    }
}
