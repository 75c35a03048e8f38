//! Client/server route transition engine.
//!
//! # Architecture Overview
//!
//! ```text
//!     push / replace / back / ...
//!     ──────────────────────────────▶ ┌──────────┐
//!                                     │  router  │ facade, collaborators
//!                                     └────┬─────┘
//!                                          ▼
//!     ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌───────────┐
//!     │ routing  │◀───│  route   │◀───│  transition  │───▶│  history  │
//!     │ matcher  │    │ resolver │    │ stages, task │    │  + scroll │
//!     └──────────┘    └──────────┘    └──────┬───────┘    └───────────┘
//!                                            │ fallback
//!                                            ▼
//!                                     ┌──────────────┐
//!                                     │    server    │ redirect slot, axum
//!                                     └──────────────┘
//! ```
//!
//! Cross-cutting: `config` (TOML), `observability` (tracing), `error`.

pub mod config;
pub mod error;
pub mod history;
pub mod observability;
pub mod route;
pub mod router;
pub mod routing;
pub mod server;
pub mod transition;

pub use error::{HandleError, NavigationError, NavigationResult};
pub use history::{History, HistoryEntry, MemoryHistory, NoopHistory};
pub use route::{MatchMode, Route, RouteLocation, RouteStatus, RouteType};
pub use router::{Router, RouterOptions};
pub use routing::RouteConfig;
pub use server::HttpServer;
pub use transition::{ConfirmHook, HookResult, NotifyHook};
