//! Configuration schema definitions.
//!
//! This module defines the declarative configuration of the routing server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::route::{RouteLocation, StateMap};
use crate::router::DEFAULT_MAX_REDIRECTS;
use crate::routing::RouteConfig;
use crate::transition::ConfirmHook;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Base URL every route lives under. Derived from request headers when
    /// unset and the server trusts them.
    pub base: Option<String>,

    /// Redirect hops allowed per navigation.
    pub max_redirects: usize,

    /// Route tree.
    pub routes: Vec<RouteDefinition>,

    /// HTTP server settings.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            routes: Vec::new(),
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl RouterConfig {
    /// Compile the declarative routes into router configs.
    pub fn route_configs(&self) -> Vec<RouteConfig> {
        self.routes.iter().map(RouteDefinition::to_route_config).collect()
    }
}

/// One declarative route.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteDefinition {
    /// Path pattern, relative to the parent for children.
    pub path: String,

    /// Micro-app key.
    pub app: Option<String>,

    /// Metadata copied onto resolved routes.
    pub meta: StateMap,

    /// Location to redirect to on entering this route.
    pub redirect: Option<String>,

    /// Status used when the redirect reaches an HTTP client.
    pub status_code: Option<u16>,

    pub children: Vec<RouteDefinition>,
}

impl RouteDefinition {
    pub fn to_route_config(&self) -> RouteConfig {
        let mut config = RouteConfig::new(self.path.clone());
        config.app = self.app.clone();
        config.meta = self.meta.clone();
        config.children = self.children.iter().map(Self::to_route_config).collect();

        if let Some(target) = &self.redirect {
            let mut location = RouteLocation::path(target.clone());
            location.status_code = self.status_code;
            config.before_enter = Some(ConfirmHook::new(move |_, _, _| {
                let location = location.clone();
                async move { Ok(location) }
            }));
        }
        config
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Derive the base URL from `X-Forwarded-*` / `Host` when `base` is unset.
    pub trust_forwarded_headers: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            trust_forwarded_headers: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(config.max_redirects, 10);
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.observability.log_level, "info");
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_nested_routes_deserialize() {
        let config: RouterConfig = toml::from_str(
            r#"
            base = "https://example.com/app/"

            [[routes]]
            path = "/user/:id"
            app = "users"
            meta = { title = "User" }

            [[routes.children]]
            path = "posts"

            [[routes]]
            path = "/old"
            redirect = "/new"
            status_code = 301
            "#,
        )
        .unwrap();

        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].children[0].path, "posts");
        assert_eq!(config.routes[0].meta.get("title").unwrap(), "User");

        let routes = config.route_configs();
        assert!(routes[0].before_enter.is_none());
        assert!(routes[1].before_enter.is_some());
        assert_eq!(routes[0].children.len(), 1);
    }
}
