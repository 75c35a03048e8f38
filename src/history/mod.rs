//! History adapters.
//!
//! # Data Flow
//! ```text
//! push / replace commit:
//!     handlers.rs → History::push / replace (state, url)
//!     → merged state written back onto the Route
//!
//! back / forward / go:
//!     Router → History::go(delta) → HistoryEntry { url, state }
//!     → Transition (route type back / forward / go)
//! ```
//!
//! # Design Decisions
//! - The router only talks to the `History` trait; hosts supply the
//!   implementation (browser shell, in-memory, none for SSR)
//! - `go` returns `None` when history cannot move

pub mod memory;
pub mod scroll;

use url::Url;

use crate::route::StateMap;

pub use memory::MemoryHistory;
pub use scroll::{ScrollAdapter, ScrollManager, ScrollPosition};

/// One history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub url: Url,
    pub state: StateMap,
}

/// Navigation history collaborator.
pub trait History: Send + Sync {
    /// Add an entry. Returns the state actually stored.
    fn push(&self, state: StateMap, url: &Url) -> StateMap;

    /// Overwrite the current entry. Returns the state actually stored.
    fn replace(&self, state: StateMap, url: &Url) -> StateMap;

    /// Move by `delta` entries. `None` when the move is impossible.
    fn go(&self, delta: i64) -> Option<HistoryEntry>;
}

/// History that records nothing. Used for server-side resolution.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHistory;

impl History for NoopHistory {
    fn push(&self, state: StateMap, _url: &Url) -> StateMap {
        state
    }

    fn replace(&self, state: StateMap, _url: &Url) -> StateMap {
        state
    }

    fn go(&self, _delta: i64) -> Option<HistoryEntry> {
        None
    }
}
