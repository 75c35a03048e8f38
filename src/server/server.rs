//! HTTP resolution server.
//!
//! # Responsibilities
//! - Create the Axum router with the resolve handler
//! - Wire up middleware (tracing, timeouts)
//! - Resolve every GET through a per-request navigation router
//! - Map navigation outcomes to HTTP responses
//!
//! # Design Decisions
//! - The route table is compiled once and shared; each request gets its own
//!   `Router` with `NoopHistory` and a fresh `ResponseSlot`
//! - Guard redirects surface as 3xx to the final URL
//! - Outcome mapping: 404 unmatched, 403 aborted, 500 failed, 200 summary

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router as HttpRouter,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;

use crate::config::RouterConfig;
use crate::error::NavigationError;
use crate::history::NoopHistory;
use crate::route::{normalize_url, Route, RouteLocation, RouteType};
use crate::router::{parse_base, Router, RouterOptions};
use crate::routing::{PatternError, RouteTable};
use crate::server::base::base_url_from_headers;
use crate::server::redirect::{ResponseSlot, ServerRedirect};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: RouteTable,
    pub config: Arc<RouterConfig>,
}

/// HTTP server resolving requests against the route table.
pub struct HttpServer {
    router: HttpRouter,
    config: Arc<RouterConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RouterConfig) -> Result<Self, PatternError> {
        let table = RouteTable::compile(config.route_configs())?;
        let config = Arc::new(config);
        let state = AppState {
            table,
            config: config.clone(),
        };
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> HttpRouter {
        HttpRouter::new()
            .route("/{*path}", get(resolve_handler))
            .route("/", get(resolve_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// The Axum router, for embedding or in-process tests.
    pub fn router(&self) -> HttpRouter {
        self.router.clone()
    }

    /// Run the server until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run the server until `shutdown` completes.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.config.routes.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

fn request_base(config: &RouterConfig, headers: &HeaderMap) -> Url {
    match &config.base {
        Some(base) => parse_base(Some(base)),
        None if config.server.trust_forwarded_headers => base_url_from_headers(headers),
        None => parse_base(None),
    }
}

/// Absolute URL of the request. Paths already under the base path are kept;
/// anything else (a proxy stripped the prefix) is placed under it.
fn request_url(base: &Url, uri: &Uri) -> Url {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    if uri.path().starts_with(base.path()) || uri.path() == base.path().trim_end_matches('/') {
        base.join(target).unwrap_or_else(|_| normalize_url(target, base))
    } else {
        normalize_url(target, base)
    }
}

/// Main resolve handler.
/// Runs a `replace` navigation and maps the outcome to a response.
async fn resolve_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let base = request_base(&state.config, &headers);
    let url = request_url(&base, &uri);

    let slot = ResponseSlot::new();
    let router = Router::with_table(
        base,
        state.table.clone(),
        RouterOptions::default()
            .history(Arc::new(NoopHistory))
            .response(slot.clone())
            .max_redirects(state.config.max_redirects),
    );

    if router
        .resolve(url.clone(), RouteType::Replace)
        .matched()
        .is_empty()
    {
        tracing::debug!(url = %url, "No route matched");
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "url": url.as_str() })),
        )
            .into_response();
    }

    let result = router.replace(RouteLocation::url(url.clone())).await;

    if let Some(redirect) = slot.take() {
        return redirect.into_response();
    }

    match result {
        Ok(route) if route.redirected_from().is_some() => {
            ServerRedirect::new(route.status_code(), route.url()).into_response()
        }
        Ok(route) => Json(route_summary(&route)).into_response(),
        Err(err @ NavigationError::Aborted { .. }) => {
            tracing::debug!(url = %url, error = %err, "Navigation aborted");
            (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "aborted", "message": err.to_string() })),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(url = %url, error = %err, "Navigation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "navigation_failed", "message": err.to_string() })),
            )
                .into_response()
        }
    }
}

/// JSON description of a resolved route.
pub fn route_summary(route: &Route) -> Value {
    json!({
        "url": route.url().as_str(),
        "path": route.path(),
        "fullPath": route.full_path(),
        "params": route.params(),
        "query": route.query(),
        "matched": route
            .matched()
            .iter()
            .map(|m| m.compile_path())
            .collect::<Vec<_>>(),
        "app": route.config().and_then(|leaf| leaf.app()),
        "meta": route.meta(),
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_keeps_base_prefix() {
        let base = Url::parse("https://example.com/app/").unwrap();
        let uri: Uri = "/app/user/1?x=1".parse().unwrap();
        assert_eq!(
            request_url(&base, &uri).as_str(),
            "https://example.com/app/user/1?x=1"
        );
    }

    #[test]
    fn test_request_url_adds_stripped_prefix() {
        let base = Url::parse("https://example.com/shop/").unwrap();
        let uri: Uri = "/cart".parse().unwrap();
        assert_eq!(request_url(&base, &uri).as_str(), "https://example.com/shop/cart");
    }
}
