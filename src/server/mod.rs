//! Server-side resolution surface.
//!
//! # Data Flow
//! ```text
//! HTTP GET
//!     → server.rs (Axum handler, TraceLayer, TimeoutLayer)
//!     → base.rs (base URL from config or X-Forwarded-* / Host)
//!     → per-request Router (NoopHistory + ResponseSlot)
//!     → replace navigation
//!     → redirect.rs (fallback redirect) or 3xx / 403 / 404 / 500 / JSON
//! ```

pub mod base;
pub mod redirect;
#[allow(clippy::module_inception)]
pub mod server;

pub use base::base_url_from_headers;
pub use redirect::{redirect_status, ResponseSlot, ServerRedirect, REDIRECT_STATUS_CODES};
pub use server::{route_summary, AppState, HttpServer};
