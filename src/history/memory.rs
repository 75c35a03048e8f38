//! In-memory history stack.

use std::sync::Mutex;

use serde_json::Value;
use url::Url;

use crate::history::{History, HistoryEntry};
use crate::route::StateMap;

/// State key holding the entry's position in the stack.
pub const POSITION_KEY: &str = "position";

#[derive(Debug, Default)]
struct Stack {
    entries: Vec<HistoryEntry>,
    index: usize,
}

/// History kept in a vector, browser-like: pushing drops forward entries.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    stack: Mutex<Stack>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with one entry at `url`.
    pub fn with_initial(url: Url) -> Self {
        let history = Self::new();
        history.replace(StateMap::new(), &url);
        history
    }

    pub fn len(&self) -> usize {
        self.stack.lock().expect("history mutex poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self) -> usize {
        self.stack.lock().expect("history mutex poisoned").index
    }

    pub fn current(&self) -> Option<HistoryEntry> {
        let stack = self.stack.lock().expect("history mutex poisoned");
        stack.entries.get(stack.index).cloned()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.stack
            .lock()
            .expect("history mutex poisoned")
            .entries
            .clone()
    }
}

fn with_position(mut state: StateMap, position: usize) -> StateMap {
    state.insert(POSITION_KEY.to_string(), Value::from(position));
    state
}

impl History for MemoryHistory {
    fn push(&self, state: StateMap, url: &Url) -> StateMap {
        let mut stack = self.stack.lock().expect("history mutex poisoned");
        let position = if stack.entries.is_empty() {
            0
        } else {
            stack.index + 1
        };
        stack.entries.truncate(position);
        let state = with_position(state, position);
        stack.entries.push(HistoryEntry {
            url: url.clone(),
            state: state.clone(),
        });
        stack.index = position;
        state
    }

    fn replace(&self, state: StateMap, url: &Url) -> StateMap {
        let mut stack = self.stack.lock().expect("history mutex poisoned");
        let position = stack.index;
        let state = with_position(state, position);
        let entry = HistoryEntry {
            url: url.clone(),
            state: state.clone(),
        };
        match stack.entries.get_mut(position) {
            Some(current) => *current = entry,
            None => stack.entries.push(entry),
        }
        state
    }

    fn go(&self, delta: i64) -> Option<HistoryEntry> {
        if delta == 0 {
            return None;
        }
        let mut stack = self.stack.lock().expect("history mutex poisoned");
        let target = i64::try_from(stack.index).ok()?.checked_add(delta)?;
        let target = usize::try_from(target).ok()?;
        let entry = stack.entries.get(target)?.clone();
        stack.index = target;
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("http://localhost/").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let history = MemoryHistory::with_initial(url("/"));
        history.push(StateMap::new(), &url("/a"));
        history.push(StateMap::new(), &url("/b"));
        assert_eq!(history.go(-2).unwrap().url, url("/"));

        history.push(StateMap::new(), &url("/c"));
        let paths: Vec<String> = history
            .entries()
            .iter()
            .map(|e| e.url.path().to_string())
            .collect();
        assert_eq!(paths, vec!["/", "/c"]);
        assert_eq!(history.index(), 1);
    }

    #[test]
    fn test_go_out_of_range() {
        let history = MemoryHistory::with_initial(url("/"));
        assert!(history.go(-1).is_none());
        assert!(history.go(1).is_none());
        assert!(history.go(0).is_none());
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn test_state_carries_position() {
        let history = MemoryHistory::new();
        let mut state = StateMap::new();
        state.insert("k".into(), Value::from("v"));
        let first = history.push(state.clone(), &url("/a"));
        let second = history.push(state, &url("/b"));
        assert_eq!(first.get(POSITION_KEY).unwrap(), 0);
        assert_eq!(second.get(POSITION_KEY).unwrap(), 1);
        assert_eq!(second.get("k").unwrap(), "v");
        assert_eq!(history.go(-1).unwrap().state, first);
    }
}
