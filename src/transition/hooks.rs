//! Hook types and the tagged hook result.
//!
//! Guards return anything convertible into [`HookResult`]; the conversion is
//! the only place where "what did the guard mean" is decided:
//!
//! | returned value                       | result     |
//! |--------------------------------------|------------|
//! | `()`, `None`, `true`                 | `Continue` |
//! | `false`                              | `Abort`    |
//! | `&str`, `String`, `RouteLocation`    | `Redirect` |
//! | `RouteHandle`                        | `Commit`   |

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;
use url::Url;

use crate::route::{Route, RouteLocation};
use crate::router::Router;

/// Outcome of a single guard or pipeline task.
pub enum HookResult {
    /// Move on to the next hook or task.
    Continue,
    /// Stop the navigation.
    Abort,
    /// Restart the pipeline at another location.
    Redirect(RouteLocation),
    /// Finish the pipeline; the handle performs the commit.
    Commit(RouteHandle),
}

impl HookResult {
    pub fn redirect(location: impl Into<RouteLocation>) -> Self {
        Self::Redirect(location.into())
    }

    pub fn commit<F>(handle: F) -> Self
    where
        F: FnOnce(&Arc<Route>, Option<&Arc<Route>>, &Router) -> anyhow::Result<Value>
            + Send
            + 'static,
    {
        Self::Commit(RouteHandle::new(handle))
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }
}

impl fmt::Debug for HookResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => f.write_str("Continue"),
            Self::Abort => f.write_str("Abort"),
            Self::Redirect(location) => f.debug_tuple("Redirect").field(location).finish(),
            Self::Commit(_) => f.write_str("Commit(..)"),
        }
    }
}

impl From<()> for HookResult {
    fn from(_: ()) -> Self {
        Self::Continue
    }
}

impl From<bool> for HookResult {
    fn from(allow: bool) -> Self {
        if allow {
            Self::Continue
        } else {
            Self::Abort
        }
    }
}

impl From<&str> for HookResult {
    fn from(path: &str) -> Self {
        Self::Redirect(path.into())
    }
}

impl From<String> for HookResult {
    fn from(path: String) -> Self {
        Self::Redirect(path.into())
    }
}

impl From<RouteLocation> for HookResult {
    fn from(location: RouteLocation) -> Self {
        Self::Redirect(location)
    }
}

impl From<RouteHandle> for HookResult {
    fn from(handle: RouteHandle) -> Self {
        Self::Commit(handle)
    }
}

impl<T: Into<HookResult>> From<Option<T>> for HookResult {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Continue, Into::into)
    }
}

type HandleFn =
    dyn FnOnce(&Arc<Route>, Option<&Arc<Route>>, &Router) -> anyhow::Result<Value> + Send;

/// The commit action of a navigation. Runs at most once.
pub struct RouteHandle(Box<HandleFn>);

impl RouteHandle {
    pub fn new<F>(handle: F) -> Self
    where
        F: FnOnce(&Arc<Route>, Option<&Arc<Route>>, &Router) -> anyhow::Result<Value>
            + Send
            + 'static,
    {
        Self(Box::new(handle))
    }

    pub(crate) fn call(
        self,
        to: &Arc<Route>,
        from: Option<&Arc<Route>>,
        router: &Router,
    ) -> anyhow::Result<Value> {
        (self.0)(to, from, router)
    }
}

impl fmt::Debug for RouteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RouteHandle(..)")
    }
}

type ConfirmFn = dyn Fn(Arc<Route>, Option<Arc<Route>>, Router) -> BoxFuture<'static, anyhow::Result<HookResult>>
    + Send
    + Sync;

/// Async guard: `before_each`, per-route hooks, location `confirm`, and the
/// built-in pipeline stages all share this shape.
///
/// Identity is pointer identity, so clones of one hook compare equal and two
/// hooks built from the same closure do not.
#[derive(Clone)]
pub struct ConfirmHook(Arc<ConfirmFn>);

impl ConfirmHook {
    pub fn new<F, Fut, R>(hook: F) -> Self
    where
        F: Fn(Arc<Route>, Option<Arc<Route>>, Router) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        R: Into<HookResult>,
    {
        Self(Arc::new(move |to, from, router| {
            let fut = hook(to, from, router);
            async move { fut.await.map(Into::into) }.boxed()
        }))
    }

    pub fn call(
        &self,
        to: &Arc<Route>,
        from: Option<&Arc<Route>>,
        router: &Router,
    ) -> BoxFuture<'static, anyhow::Result<HookResult>> {
        (self.0)(to.clone(), from.cloned(), router.clone())
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for ConfirmHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfirmHook({:p})", Arc::as_ptr(&self.0))
    }
}

type NotifyFn = dyn Fn(&Arc<Route>, Option<&Arc<Route>>, &Router) + Send + Sync;

/// Synchronous notification run after a committed navigation.
#[derive(Clone)]
pub struct NotifyHook(Arc<NotifyFn>);

impl NotifyHook {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&Arc<Route>, Option<&Arc<Route>>, &Router) + Send + Sync + 'static,
    {
        Self(Arc::new(hook))
    }

    pub fn call(&self, to: &Arc<Route>, from: Option<&Arc<Route>>, router: &Router) {
        (self.0)(to, from, router)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for NotifyHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NotifyHook({:p})", Arc::as_ptr(&self.0))
    }
}

type FallbackFn =
    dyn Fn(&Arc<Route>, Option<&Arc<Route>>, &Router) -> anyhow::Result<Value> + Send + Sync;

/// Handles navigations the app cannot commit itself: unmatched and external
/// URLs, new windows, layers.
#[derive(Clone)]
pub struct FallbackHook(Arc<FallbackFn>);

impl FallbackHook {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&Arc<Route>, Option<&Arc<Route>>, &Router) -> anyhow::Result<Value>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(hook))
    }

    pub fn call(
        &self,
        to: &Arc<Route>,
        from: Option<&Arc<Route>>,
        router: &Router,
    ) -> anyhow::Result<Value> {
        (self.0)(to, from, router)
    }
}

impl fmt::Debug for FallbackHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FallbackHook(..)")
    }
}

/// Caller hook applied to every resolved URL: `(url, from_url) -> url`.
#[derive(Clone)]
pub struct NormalizeUrl(Arc<dyn Fn(Url, Option<&Url>) -> Url + Send + Sync>);

impl NormalizeUrl {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(Url, Option<&Url>) -> Url + Send + Sync + 'static,
    {
        Self(Arc::new(hook))
    }

    pub fn call(&self, url: Url, from: Option<&Url>) -> Url {
        (self.0)(url, from)
    }
}

impl fmt::Debug for NormalizeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NormalizeUrl(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_conversions() {
        assert!(matches!(HookResult::from(()), HookResult::Continue));
        assert!(matches!(HookResult::from(true), HookResult::Continue));
        assert!(matches!(HookResult::from(false), HookResult::Abort));
        assert!(matches!(HookResult::from(None::<bool>), HookResult::Continue));
        assert!(matches!(HookResult::from(Some(false)), HookResult::Abort));
        match HookResult::from("/login") {
            HookResult::Redirect(location) => assert_eq!(location.target_str(), "/login"),
            other => panic!("unexpected {other:?}"),
        }
        let handle = RouteHandle::new(|_, _, _| Ok(Value::Null));
        assert!(matches!(HookResult::from(handle), HookResult::Commit(_)));
    }

    #[test]
    fn test_hook_identity() {
        let a = ConfirmHook::new(|_, _, _| async { Ok(()) });
        let b = a.clone();
        let c = ConfirmHook::new(|_, _, _| async { Ok(()) });
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));

        let n = NotifyHook::new(|_, _, _| {});
        assert!(n.ptr_eq(&n.clone()));
    }
}
