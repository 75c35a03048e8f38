//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route patterns compile and redirect codes are redirects
//! - Validate value ranges (timeouts > 0, redirect limit > 0, bind address)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{RouteDefinition, RouterConfig};
use crate::routing::RouteTable;
use crate::server::redirect::is_redirect_status;

/// One semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(base) = &config.base {
        if !base.starts_with('/') {
            match Url::parse(base) {
                Ok(url) if url.cannot_be_a_base() => {
                    errors.push(ValidationError::new("base", "URL cannot be a base"))
                }
                Ok(_) => {}
                Err(e) => errors.push(ValidationError::new("base", e.to_string())),
            }
        }
    }

    if config.max_redirects == 0 {
        errors.push(ValidationError::new("max_redirects", "must be greater than 0"));
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("invalid socket address '{}'", config.server.bind_address),
        ));
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "server.request_timeout_secs",
            "must be greater than 0",
        ));
    }

    for (i, route) in config.routes.iter().enumerate() {
        validate_route(route, &format!("routes[{i}]"), &mut errors);
    }

    if let Err(e) = RouteTable::compile(config.route_configs()) {
        errors.push(ValidationError::new("routes", e.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(route: &RouteDefinition, field: &str, errors: &mut Vec<ValidationError>) {
    if let Some(code) = route.status_code {
        if route.redirect.is_none() {
            errors.push(ValidationError::new(
                format!("{field}.status_code"),
                "set without redirect",
            ));
        } else if !is_redirect_status(code) {
            errors.push(ValidationError::new(
                format!("{field}.status_code"),
                format!("{code} is not a redirect status"),
            ));
        }
    }
    if route.redirect.as_deref().is_some_and(str::is_empty) {
        errors.push(ValidationError::new(format!("{field}.redirect"), "is empty"));
    }
    for (i, child) in route.children.iter().enumerate() {
        validate_route(child, &format!("{field}.children[{i}]"), errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RouterConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = RouterConfig::default();
        config.server.bind_address = "nowhere".into();
        config.server.request_timeout_secs = 0;
        config.base = Some("not a url".into());
        config.routes.push(RouteDefinition {
            path: "/x".into(),
            children: vec![RouteDefinition {
                path: "y".into(),
                status_code: Some(301),
                ..Default::default()
            }],
            ..Default::default()
        });

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "base",
                "server.bind_address",
                "server.request_timeout_secs",
                "routes[0].children[0].status_code",
            ]
        );
    }
}
