//! The resolved navigation target.
//!
//! # Responsibilities
//! - Hold everything known about one navigation attempt (URL, matched
//!   chain, params, query, state)
//! - Track the attempt's status, moving at most once to a terminal value
//! - Own the commit handle and enforce its single, status-gated invocation
//!
//! # Design Decisions
//! - A new `Route` is built for every attempt and every redirect hop; a
//!   redirect never mutates the route it leaves
//! - Status lives in an atomic so pipelines and observers never lock for it
//! - Handle enforcement is an explicit slot (`Empty | Ready | Consumed`)

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::HandleError;
use crate::route::StateMap;
use crate::router::Router;
use crate::routing::{MatchedRoute, Params};
use crate::transition::{ConfirmHook, RouteHandle, TaskName};

/// Navigation kind. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    Push,
    Replace,
    PushWindow,
    ReplaceWindow,
    RestartApp,
    Back,
    Go,
    Forward,
    None,
    Unknown,
    PushLayer,
}

impl RouteType {
    pub const ALL: [RouteType; 11] = [
        RouteType::Push,
        RouteType::Replace,
        RouteType::PushWindow,
        RouteType::ReplaceWindow,
        RouteType::RestartApp,
        RouteType::Back,
        RouteType::Go,
        RouteType::Forward,
        RouteType::None,
        RouteType::Unknown,
        RouteType::PushLayer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteType::Push => "push",
            RouteType::Replace => "replace",
            RouteType::PushWindow => "push_window",
            RouteType::ReplaceWindow => "replace_window",
            RouteType::RestartApp => "restart_app",
            RouteType::Back => "back",
            RouteType::Go => "go",
            RouteType::Forward => "forward",
            RouteType::None => "none",
            RouteType::Unknown => "unknown",
            RouteType::PushLayer => "push_layer",
        }
    }

    /// Navigations driven by a history move rather than a new entry.
    pub fn is_history_move(&self) -> bool {
        matches!(self, RouteType::Back | RouteType::Go | RouteType::Forward)
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a route.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStatus {
    Resolve = 0,
    Success = 1,
    Aborted = 2,
    Error = 3,
}

impl From<u8> for RouteStatus {
    fn from(val: u8) -> Self {
        match val {
            1 => RouteStatus::Success,
            2 => RouteStatus::Aborted,
            3 => RouteStatus::Error,
            _ => RouteStatus::Resolve,
        }
    }
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RouteStatus::Resolve => "resolve",
            RouteStatus::Success => "success",
            RouteStatus::Aborted => "aborted",
            RouteStatus::Error => "error",
        })
    }
}

/// Why a navigation did not commit.
#[derive(Debug, Clone)]
pub enum Interruption {
    /// A newer navigation superseded this one before `task` ran or finished.
    Cancelled { task: TaskName },
    /// A hook in `task` returned `false`.
    Aborted { task: TaskName },
    /// A hook in `task` failed.
    Failed {
        task: TaskName,
        error: Arc<anyhow::Error>,
    },
    /// A hook redirected to the route it was guarding.
    SelfRedirect,
    /// A hook redirected to a URL already visited in this chain.
    RedirectLoop { url: Url },
    /// More redirect hops than allowed.
    RedirectLimit { limit: usize },
    /// The commit handle itself failed.
    CommitFailed { error: Arc<anyhow::Error> },
}

enum HandleSlot {
    Empty,
    Ready(RouteHandle),
    Consumed,
}

/// Construction-time values of a route, assembled by the resolver.
pub(crate) struct RouteParts {
    pub route_type: RouteType,
    pub url: Url,
    pub path: String,
    pub full_path: String,
    pub matched: Vec<Arc<MatchedRoute>>,
    pub params: Params,
    pub query: BTreeMap<String, String>,
    pub query_array: BTreeMap<String, Vec<String>>,
    pub state: StateMap,
    pub status_code: Option<u16>,
    pub keep_scroll_position: bool,
    pub confirm: Option<ConfirmHook>,
    pub redirected_from: Option<Arc<Route>>,
}

/// A resolved navigation target.
pub struct Route {
    route_type: RouteType,
    url: Url,
    path: String,
    full_path: String,
    matched: Vec<Arc<MatchedRoute>>,
    meta: StateMap,
    params: Params,
    query: BTreeMap<String, String>,
    query_array: BTreeMap<String, Vec<String>>,
    status_code: Option<u16>,
    keep_scroll_position: bool,
    confirm: Option<ConfirmHook>,
    redirected_from: Option<Arc<Route>>,
    state: Mutex<StateMap>,
    status: AtomicU8,
    handle: Mutex<HandleSlot>,
    handle_result: Mutex<Option<Value>>,
    interruption: Mutex<Option<Interruption>>,
}

impl Route {
    pub(crate) fn from_parts(parts: RouteParts) -> Self {
        let meta = parts
            .matched
            .last()
            .map(|leaf| leaf.meta().clone())
            .unwrap_or_default();
        Self {
            route_type: parts.route_type,
            url: parts.url,
            path: parts.path,
            full_path: parts.full_path,
            matched: parts.matched,
            meta,
            params: parts.params,
            query: parts.query,
            query_array: parts.query_array,
            status_code: parts.status_code,
            keep_scroll_position: parts.keep_scroll_position,
            confirm: parts.confirm,
            redirected_from: parts.redirected_from,
            state: Mutex::new(parts.state),
            status: AtomicU8::new(RouteStatus::Resolve as u8),
            handle: Mutex::new(HandleSlot::Empty),
            handle_result: Mutex::new(None),
            interruption: Mutex::new(None),
        }
    }

    pub fn route_type(&self) -> RouteType {
        self.route_type
    }

    /// Absolute target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Pathname relative to the router base (absolute pathname outside it).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `path` plus query and fragment.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Matched chain, root first. Empty when nothing matched.
    pub fn matched(&self) -> &[Arc<MatchedRoute>] {
        &self.matched
    }

    /// Leaf of the matched chain.
    pub fn config(&self) -> Option<&Arc<MatchedRoute>> {
        self.matched.last()
    }

    pub fn meta(&self) -> &StateMap {
        &self.meta
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// First value per query key.
    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Every value per query key.
    pub fn query_array(&self) -> &BTreeMap<String, Vec<String>> {
        &self.query_array
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn keep_scroll_position(&self) -> bool {
        self.keep_scroll_position
    }

    pub fn confirm(&self) -> Option<&ConfirmHook> {
        self.confirm.as_ref()
    }

    /// The route this one was redirected away from.
    pub fn redirected_from(&self) -> Option<&Arc<Route>> {
        self.redirected_from.as_ref()
    }

    pub fn state(&self) -> StateMap {
        self.state.lock().expect("route state mutex poisoned").clone()
    }

    pub(crate) fn set_state(&self, state: StateMap) {
        *self.state.lock().expect("route state mutex poisoned") = state;
    }

    pub fn status(&self) -> RouteStatus {
        RouteStatus::from(self.status.load(Ordering::Acquire))
    }

    /// Move from `Resolve` to `status`. Later calls are ignored.
    pub(crate) fn set_status(&self, status: RouteStatus) -> bool {
        self.status
            .compare_exchange(
                RouteStatus::Resolve as u8,
                status as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub fn interruption(&self) -> Option<Interruption> {
        self.interruption
            .lock()
            .expect("route interruption mutex poisoned")
            .clone()
    }

    pub(crate) fn interrupt(&self, status: RouteStatus, reason: Interruption) {
        self.set_status(status);
        *self
            .interruption
            .lock()
            .expect("route interruption mutex poisoned") = Some(reason);
    }

    pub(crate) fn set_handle(&self, handle: RouteHandle) {
        let mut slot = self.handle.lock().expect("route handle mutex poisoned");
        if matches!(*slot, HandleSlot::Empty) {
            *slot = HandleSlot::Ready(handle);
        }
    }

    /// True while a handle is waiting to be invoked.
    pub fn has_handle(&self) -> bool {
        matches!(
            *self.handle.lock().expect("route handle mutex poisoned"),
            HandleSlot::Ready(_)
        )
    }

    /// Value returned by the handle, once it ran.
    pub fn handle_result(&self) -> Option<Value> {
        self.handle_result
            .lock()
            .expect("route handle result mutex poisoned")
            .clone()
    }

    /// Run the commit handle. Allowed once, and only after success.
    pub fn invoke_handle(
        self: &Arc<Self>,
        from: Option<&Arc<Route>>,
        router: &Router,
    ) -> Result<Value, HandleError> {
        let handle = {
            let mut slot = self.handle.lock().expect("route handle mutex poisoned");
            match std::mem::replace(&mut *slot, HandleSlot::Consumed) {
                HandleSlot::Consumed => return Err(HandleError::Consumed),
                HandleSlot::Empty => {
                    *slot = HandleSlot::Empty;
                    return Err(HandleError::Missing);
                }
                HandleSlot::Ready(handle) => {
                    let status = self.status();
                    if status != RouteStatus::Success {
                        *slot = HandleSlot::Ready(handle);
                        return Err(HandleError::NotReady { status });
                    }
                    handle
                }
            }
        };

        let result = handle
            .call(self, from, router)
            .map_err(|err| HandleError::Commit(Arc::new(err)))?;
        *self
            .handle_result
            .lock()
            .expect("route handle result mutex poisoned") = Some(result.clone());
        Ok(result)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("type", &self.route_type)
            .field("url", &self.url.as_str())
            .field("status", &self.status())
            .field("matched", &self.matched.len())
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> Route {
        Route::from_parts(RouteParts {
            route_type: RouteType::Push,
            url: Url::parse("http://localhost/a").unwrap(),
            path: "/a".into(),
            full_path: "/a".into(),
            matched: Vec::new(),
            params: Params::new(),
            query: BTreeMap::new(),
            query_array: BTreeMap::new(),
            state: StateMap::new(),
            status_code: None,
            keep_scroll_position: false,
            confirm: None,
            redirected_from: None,
        })
    }

    #[test]
    fn test_status_transitions_once() {
        let route = route();
        assert_eq!(route.status(), RouteStatus::Resolve);
        assert!(route.set_status(RouteStatus::Aborted));
        assert!(!route.set_status(RouteStatus::Success));
        assert_eq!(route.status(), RouteStatus::Aborted);
    }

    #[test]
    fn test_interrupt_keeps_first_status() {
        let route = route();
        route.interrupt(
            RouteStatus::Error,
            Interruption::Failed {
                task: TaskName::BeforeEach,
                error: Arc::new(anyhow::anyhow!("boom")),
            },
        );
        assert_eq!(route.status(), RouteStatus::Error);
        assert!(matches!(
            route.interruption(),
            Some(Interruption::Failed { task: TaskName::BeforeEach, .. })
        ));
    }

    #[test]
    fn test_set_handle_only_once() {
        let route = route();
        assert!(!route.has_handle());
        route.set_handle(RouteHandle::new(|_, _, _| Ok(Value::from(1))));
        route.set_handle(RouteHandle::new(|_, _, _| Ok(Value::from(2))));
        assert!(route.has_handle());
    }

    #[test]
    fn test_route_type_names() {
        let moves: Vec<_> = RouteType::ALL
            .iter()
            .filter(|t| t.is_history_move())
            .map(|t| t.as_str())
            .collect();
        assert_eq!(moves, ["back", "go", "forward"]);
        assert_eq!(RouteType::PushWindow.to_string(), "push_window");
    }

    #[test]
    fn test_status_codes_roundtrip() {
        for status in [
            RouteStatus::Resolve,
            RouteStatus::Success,
            RouteStatus::Aborted,
            RouteStatus::Error,
        ] {
            assert_eq!(RouteStatus::from(status as u8), status);
        }
        assert_eq!(RouteStatus::from(42), RouteStatus::Resolve);
    }
}
