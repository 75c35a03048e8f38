//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at router construction):
//!     RouteConfig[] (application tree)
//!     → pattern.rs (parse path patterns)
//!     → matcher.rs (join child paths, build MatchedRoute tree)
//!     → Freeze as immutable RouteTable
//!
//! Lookup (per navigation attempt):
//!     URL relative to base
//!     → matcher.rs (deepest match, parent-first chain)
//!     → Return: RouteMatch { matches, params } or no match
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable at runtime
//! - No regex in hot path (segment matching only)
//! - Deterministic: same input always matches same chain
//! - No match is a value, not an error (the fallback stage handles it)

pub mod matcher;
pub mod pattern;
pub mod record;

pub use matcher::{MatchedRoute, RouteMatch, RouteTable};
pub use pattern::{Params, PathPattern, PatternError};
pub use record::{Component, ComponentLoader, RouteConfig};
