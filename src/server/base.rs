//! Base URL derivation from request headers.
//!
//! Behind a reverse proxy the public origin differs from the bind address.
//! `X-Forwarded-*` headers carry the public scheme, host, port and path
//! prefix; `Host` is the fallback.

use axum::http::HeaderMap;
use url::Url;

use crate::router::default_base;

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_HOST: &str = "x-forwarded-host";
const X_FORWARDED_PORT: &str = "x-forwarded-port";
const X_FORWARDED_PREFIX: &str = "x-forwarded-prefix";

// Proxies may append comma-separated values; the first hop is the client's.
fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .map(str::trim)
        .find(|v| !v.is_empty())
}

/// Public base URL of the current request. Always ends with `/`.
pub fn base_url_from_headers(headers: &HeaderMap) -> Url {
    let scheme = first_value(headers, X_FORWARDED_PROTO).unwrap_or("http");
    let host = first_value(headers, X_FORWARDED_HOST)
        .or_else(|| first_value(headers, axum::http::header::HOST.as_str()))
        .unwrap_or("localhost");
    let port = first_value(headers, X_FORWARDED_PORT);
    let prefix = first_value(headers, X_FORWARDED_PREFIX).unwrap_or("");

    let mut url = match Url::parse(&format!("{scheme}://{host}/")) {
        Ok(url) => url,
        Err(err) => {
            tracing::warn!(scheme = %scheme, host = %host, error = %err, "Invalid forwarded base");
            return default_base();
        }
    };

    if let Some(port) = port.and_then(|p| p.parse::<u16>().ok()) {
        if url.set_port(Some(port)).is_err() {
            tracing::warn!(port, url = %url, "Ignoring X-Forwarded-Port");
        }
    }

    let prefix = prefix.trim_matches('/');
    if !prefix.is_empty() {
        url.set_path(&format!("/{prefix}/"));
    }
    url
}
