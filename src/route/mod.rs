//! Route values.
//!
//! # Data Flow
//! ```text
//! Navigation input:
//!     RouteLocation (path or URL + query, params, hash, state)
//!     → location.rs (absolute URL against the base)
//!     → resolver.rs (origin/base gate, matcher, param splice)
//!     → Route (one per attempt and per redirect hop)
//!
//! Comparison:
//!     Route × Route → compare.rs (leaf identity, URL equality, prefix)
//! ```
//!
//! # Design Decisions
//! - Routes are shared as `Arc<Route>`; only status, state, handle and
//!   interruption change after construction
//! - URL equality ignores the order of distinct query keys

pub mod compare;
pub mod location;
pub mod resolver;
#[allow(clippy::module_inception)]
pub mod route;

pub use compare::{is_route_matched, is_url_equal, MatchMode};
pub use location::{normalize_url, LocationTarget, RouteLocation, StateMap};
pub use resolver::RouteResolver;
pub use route::{Interruption, Route, RouteStatus, RouteType};
