//! Scroll position hook points.
//!
//! The router has no viewport. Hosts that do plug in a `ScrollAdapter`;
//! without one every call here is a no-op.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::route::compare::canonical_url;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

impl ScrollPosition {
    pub const ORIGIN: ScrollPosition = ScrollPosition { x: 0.0, y: 0.0 };
}

/// Host viewport.
pub trait ScrollAdapter: Send + Sync {
    fn position(&self) -> ScrollPosition;
    fn scroll_to(&self, position: ScrollPosition);
}

/// Saves positions per URL and restores them on history moves.
#[derive(Default)]
pub struct ScrollManager {
    adapter: Option<Arc<dyn ScrollAdapter>>,
    saved: Mutex<HashMap<String, ScrollPosition>>,
}

impl ScrollManager {
    pub fn new(adapter: Option<Arc<dyn ScrollAdapter>>) -> Self {
        Self {
            adapter,
            saved: Mutex::new(HashMap::new()),
        }
    }

    /// Remember the current position for `url`.
    pub fn save(&self, url: &Url) {
        let Some(adapter) = &self.adapter else {
            return;
        };
        self.saved
            .lock()
            .expect("scroll mutex poisoned")
            .insert(canonical_url(url), adapter.position());
    }

    pub fn saved(&self, url: &Url) -> Option<ScrollPosition> {
        self.saved
            .lock()
            .expect("scroll mutex poisoned")
            .get(&canonical_url(url))
            .copied()
    }

    /// Scroll back to the position saved for `url`, or the origin.
    pub fn restore(&self, url: &Url) {
        if let Some(adapter) = &self.adapter {
            adapter.scroll_to(self.saved(url).unwrap_or(ScrollPosition::ORIGIN));
        }
    }

    pub fn reset(&self) {
        if let Some(adapter) = &self.adapter {
            adapter.scroll_to(ScrollPosition::ORIGIN);
        }
    }
}

impl fmt::Debug for ScrollManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollManager")
            .field("adapter", &self.adapter.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Viewport(Mutex<ScrollPosition>);

    impl ScrollAdapter for Viewport {
        fn position(&self) -> ScrollPosition {
            *self.0.lock().unwrap()
        }

        fn scroll_to(&self, position: ScrollPosition) {
            *self.0.lock().unwrap() = position;
        }
    }

    #[test]
    fn test_save_and_restore() {
        let viewport = Arc::new(Viewport::default());
        let manager = ScrollManager::new(Some(viewport.clone()));
        let a = Url::parse("http://localhost/a?x=1&y=2").unwrap();
        let b = Url::parse("http://localhost/b").unwrap();

        viewport.scroll_to(ScrollPosition { x: 0.0, y: 120.0 });
        manager.save(&a);
        manager.reset();
        assert_eq!(viewport.position(), ScrollPosition::ORIGIN);

        let a_reordered = Url::parse("http://localhost/a?y=2&x=1").unwrap();
        manager.restore(&a_reordered);
        assert_eq!(viewport.position().y, 120.0);

        manager.restore(&b);
        assert_eq!(viewport.position(), ScrollPosition::ORIGIN);
    }

    #[test]
    fn test_without_adapter_is_noop() {
        let manager = ScrollManager::default();
        let url = Url::parse("http://localhost/").unwrap();
        manager.save(&url);
        manager.restore(&url);
        assert!(manager.saved(&url).is_none());
    }
}
