//! Default fallback handler.
//!
//! Runs for navigations the app cannot commit itself: unmatched and
//! external URLs, new windows and layers. On the server it writes a
//! redirect into the request's `ResponseSlot`; in a browser shell it hands
//! the URL to a `LocationHandler`; with neither it logs and drops the
//! navigation.

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::route::{Route, RouteType};
use crate::router::Router;
use crate::server::redirect::ServerRedirect;

/// Host-side full navigation (`location.href = url`, `window.open(url)`).
pub trait LocationHandler: Send + Sync {
    fn assign(&self, url: &Url, route_type: RouteType) -> anyhow::Result<Value>;
}

pub fn default_fallback(
    to: &Arc<Route>,
    _from: Option<&Arc<Route>>,
    router: &Router,
) -> anyhow::Result<Value> {
    if let Some(slot) = router.response() {
        let redirect = ServerRedirect::new(to.status_code(), to.url());
        tracing::debug!(
            url = %to.url(),
            status = redirect.status,
            "Writing server redirect"
        );
        let value = redirect.to_json();
        slot.set(redirect);
        return Ok(value);
    }

    if let Some(location) = router.location_handler() {
        return location.assign(to.url(), to.route_type());
    }

    tracing::warn!(
        url = %to.url(),
        route_type = %to.route_type(),
        "No fallback target for navigation, ignoring"
    );
    Ok(Value::Null)
}
