//! Navigation transitions.
//!
//! # Data Flow
//! ```text
//! Navigation (push / replace / back / ...):
//!     manager.rs (build Route, abort previous controller)
//!     → stage list for the RouteType (resolved once)
//!     → task.rs (run stages in order, follow redirects, check cancellation)
//!         fallback → override → before_leave → before_each
//!         → before_update → before_enter → async_component → confirm
//!     → handlers.rs (commit: history, current route, micro-app, scroll)
//!     → guards.rs (after_each notifications)
//! ```
//!
//! # Design Decisions
//! - Every stage is a `ConfirmHook`; built-in stages and user guards share
//!   one result type (`HookResult`)
//! - Within a stage the first non-`Continue` result wins
//! - Cancellation is cooperative, through a generation counter

pub mod guards;
pub mod handlers;
pub mod hooks;
pub mod manager;
pub mod stages;
pub mod task;

pub use guards::{GuardHandle, GuardRegistry};
pub use hooks::{ConfirmHook, FallbackHook, HookResult, NormalizeUrl, NotifyHook, RouteHandle};
pub use manager::{stages_for, Transition};
pub use task::{run_route_task, RouteTask, RouteTaskRun, TaskController, TaskName};
