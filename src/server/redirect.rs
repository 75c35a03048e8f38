//! Server-side redirects written by the fallback handler.
//!
//! # Responsibilities
//! - Validate redirect status codes
//! - Hold the redirect a navigation produced until the request handler
//!   turns it into a response
//!
//! # Design Decisions
//! - Invalid codes fall back to 302 with a warning, never an error
//! - 304 carries no `Location` header

use std::sync::{Arc, Mutex};

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use url::Url;

/// Status codes accepted for a server redirect.
pub const REDIRECT_STATUS_CODES: [u16; 7] = [300, 301, 302, 303, 304, 307, 308];

pub const DEFAULT_REDIRECT_STATUS: u16 = 302;

pub fn is_redirect_status(code: u16) -> bool {
    REDIRECT_STATUS_CODES.contains(&code)
}

/// Pick the status for a redirect, defaulting to 302.
pub fn redirect_status(code: Option<u16>) -> u16 {
    match code {
        None => DEFAULT_REDIRECT_STATUS,
        Some(code) if is_redirect_status(code) => code,
        Some(code) => {
            tracing::warn!(
                status_code = code,
                fallback = DEFAULT_REDIRECT_STATUS,
                "Invalid redirect status code"
            );
            DEFAULT_REDIRECT_STATUS
        }
    }
}

/// A redirect to send instead of a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRedirect {
    pub status: u16,
    pub location: Option<Url>,
}

impl ServerRedirect {
    pub fn new(status_code: Option<u16>, location: &Url) -> Self {
        let status = redirect_status(status_code);
        let location = (status != 304).then(|| location.clone());
        Self { status, location }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "status": self.status,
            "location": self.location.as_ref().map(Url::as_str),
        })
    }
}

impl IntoResponse for ServerRedirect {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::FOUND);
        match self.location {
            Some(location) => (status, [(header::LOCATION, location.to_string())]).into_response(),
            None => status.into_response(),
        }
    }
}

/// Per-request slot the fallback handler writes its redirect into.
#[derive(Debug, Clone, Default)]
pub struct ResponseSlot(Arc<Mutex<Option<ServerRedirect>>>);

impl ResponseSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, redirect: ServerRedirect) {
        *self.0.lock().expect("response slot mutex poisoned") = Some(redirect);
    }

    pub fn get(&self) -> Option<ServerRedirect> {
        self.0.lock().expect("response slot mutex poisoned").clone()
    }

    pub fn take(&self) -> Option<ServerRedirect> {
        self.0.lock().expect("response slot mutex poisoned").take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://example.com/login").unwrap()
    }

    #[test]
    fn test_status_code_rules() {
        assert_eq!(redirect_status(None), 302);
        assert_eq!(redirect_status(Some(301)), 301);
        assert_eq!(redirect_status(Some(308)), 308);
        assert_eq!(redirect_status(Some(200)), 302);
        assert_eq!(redirect_status(Some(305)), 302);
    }

    #[test]
    fn test_not_modified_has_no_location() {
        let redirect = ServerRedirect::new(Some(304), &url());
        assert_eq!(redirect.status, 304);
        assert!(redirect.location.is_none());

        let response = redirect.into_response();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[test]
    fn test_redirect_response() {
        let response = ServerRedirect::new(Some(307), &url()).into_response();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://example.com/login"
        );
    }

    #[test]
    fn test_slot_is_shared() {
        let slot = ResponseSlot::new();
        let clone = slot.clone();
        clone.set(ServerRedirect::new(None, &url()));
        assert_eq!(slot.get().unwrap().status, 302);
        assert!(slot.take().is_some());
        assert!(clone.get().is_none());
    }
}
