//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!         debug: navigation start, redirect hops, commits
//!         warn:  invalid base URL, invalid redirect codes, dropped fallbacks
//!         error: hook failures, commit failures, redirect loops
//!     → logging.rs (subscriber + EnvFilter + fmt layer)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Library code only emits events; the binary installs the subscriber
//! - HTTP request spans come from tower-http's `TraceLayer`

pub mod logging;

pub use logging::init_logging;
