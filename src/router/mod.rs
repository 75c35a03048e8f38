//! Public router facade.
//!
//! # Data Flow
//! ```text
//! Application
//!     → Router::push / replace / back / ... (this module)
//!     → Transition::to (transition/manager.rs)
//!     → Arc<Route> or NavigationError
//!
//! Collaborators (supplied through RouterOptions):
//!     History        (history/)        push / replace / go
//!     MicroApp       (options.rs)      update / destroy
//!     ScrollAdapter  (history/scroll)  position / scroll_to
//!     FallbackHook   (fallback.rs)     server redirect or LocationHandler
//! ```
//!
//! # Design Decisions
//! - `Router` is a cheap handle over shared state; hooks receive clones
//! - Failed navigations leave the current route untouched
//! - After `destroy` every navigation fails fast

pub mod fallback;
pub mod options;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use url::Url;

use crate::error::{NavigationError, NavigationResult};
use crate::history::{History, ScrollManager};
use crate::route::{is_route_matched, MatchMode, Route, RouteLocation, RouteResolver, RouteType};
use crate::routing::{PatternError, RouteTable};
use crate::server::redirect::ResponseSlot;
use crate::transition::{ConfirmHook, FallbackHook, GuardHandle, GuardRegistry, NotifyHook, Transition};

pub use fallback::{default_fallback, LocationHandler};
pub(crate) use options::default_base;
pub use options::{parse_base, MicroApp, RouterOptions, DEFAULT_BASE, DEFAULT_MAX_REDIRECTS};

struct RouterInner {
    resolver: RouteResolver,
    transition: Transition,
    guards: Arc<GuardRegistry>,
    history: Arc<dyn History>,
    fallback: FallbackHook,
    location: Option<Arc<dyn LocationHandler>>,
    response: Option<ResponseSlot>,
    micro_app: Option<Arc<dyn MicroApp>>,
    scroll: ScrollManager,
    max_redirects: usize,
    destroyed: AtomicBool,
}

/// Client/server router. Clones share one router.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    /// Compile the route table and build a router. Fails only on malformed
    /// route patterns.
    pub fn new(mut options: RouterOptions) -> Result<Self, PatternError> {
        let base = parse_base(options.base.as_deref());
        let table = RouteTable::compile(std::mem::take(&mut options.routes))?;
        Ok(Self::with_table(base, table, options))
    }

    /// Build a router over an already compiled table. `options.routes` is
    /// ignored.
    pub fn with_table(base: Url, table: RouteTable, options: RouterOptions) -> Self {
        tracing::debug!(base = %base, routes = table.roots().len(), "Router created");
        Self {
            inner: Arc::new(RouterInner {
                resolver: RouteResolver::new(base, table, options.normalize_url),
                transition: Transition::new(),
                guards: Arc::new(GuardRegistry::new()),
                history: options.history,
                fallback: options
                    .fallback
                    .unwrap_or_else(|| FallbackHook::new(default_fallback)),
                location: options.location,
                response: options.response,
                micro_app: options.micro_app,
                scroll: ScrollManager::new(options.scroll),
                max_redirects: options.max_redirects,
                destroyed: AtomicBool::new(false),
            }),
        }
    }

    pub fn base(&self) -> &Url {
        self.inner.resolver.base()
    }

    /// Resolve a location without navigating.
    pub fn resolve(&self, location: impl Into<RouteLocation>, route_type: RouteType) -> Arc<Route> {
        let from = self.route();
        Arc::new(Route::new(
            &self.inner.resolver,
            route_type,
            &location.into(),
            from.as_ref().map(|route| route.url()),
            None,
        ))
    }

    /// Current committed route.
    pub fn route(&self) -> Option<Arc<Route>> {
        self.inner.transition.current()
    }

    /// Compare the current route against `route`.
    pub fn is_route_matched(&self, route: &Route, mode: MatchMode) -> bool {
        self.route()
            .is_some_and(|current| is_route_matched(&current, route, mode))
    }

    pub async fn push(&self, location: impl Into<RouteLocation>) -> NavigationResult<Arc<Route>> {
        self.navigate(RouteType::Push, location.into()).await
    }

    pub async fn replace(&self, location: impl Into<RouteLocation>) -> NavigationResult<Arc<Route>> {
        self.navigate(RouteType::Replace, location.into()).await
    }

    pub async fn push_window(
        &self,
        location: impl Into<RouteLocation>,
    ) -> NavigationResult<Arc<Route>> {
        self.navigate(RouteType::PushWindow, location.into()).await
    }

    pub async fn replace_window(
        &self,
        location: impl Into<RouteLocation>,
    ) -> NavigationResult<Arc<Route>> {
        self.navigate(RouteType::ReplaceWindow, location.into()).await
    }

    pub async fn push_layer(
        &self,
        location: impl Into<RouteLocation>,
    ) -> NavigationResult<Arc<Route>> {
        self.navigate(RouteType::PushLayer, location.into()).await
    }

    /// Restart the app at the current URL (the base when nothing committed).
    pub async fn restart_app(&self) -> NavigationResult<Arc<Route>> {
        let url = self
            .route()
            .map(|route| route.url().clone())
            .unwrap_or_else(|| self.base().clone());
        self.navigate(RouteType::RestartApp, RouteLocation::url(url))
            .await
    }

    pub async fn restart_app_to(
        &self,
        location: impl Into<RouteLocation>,
    ) -> NavigationResult<Arc<Route>> {
        self.navigate(RouteType::RestartApp, location.into()).await
    }

    pub async fn back(&self) -> NavigationResult<Option<Arc<Route>>> {
        self.history_move(RouteType::Back, -1).await
    }

    pub async fn forward(&self) -> NavigationResult<Option<Arc<Route>>> {
        self.history_move(RouteType::Forward, 1).await
    }

    pub async fn go(&self, delta: i64) -> NavigationResult<Option<Arc<Route>>> {
        self.history_move(RouteType::Go, delta).await
    }

    /// Navigate with an explicit type.
    pub async fn navigate(
        &self,
        route_type: RouteType,
        location: RouteLocation,
    ) -> NavigationResult<Arc<Route>> {
        if self.is_destroyed() {
            return Err(NavigationError::Destroyed);
        }
        let route = self.inner.transition.to(self, route_type, location).await;
        match route.interruption() {
            Some(interruption) => Err(NavigationError::from_interruption(route, interruption)),
            None => Ok(route),
        }
    }

    async fn history_move(
        &self,
        route_type: RouteType,
        delta: i64,
    ) -> NavigationResult<Option<Arc<Route>>> {
        if self.is_destroyed() {
            return Err(NavigationError::Destroyed);
        }
        let Some(entry) = self.inner.history.go(delta) else {
            return Ok(None);
        };
        let location = RouteLocation::url(entry.url).with_state_map(entry.state);
        match self.navigate(route_type, location).await {
            Ok(route) => Ok(Some(route)),
            Err(err) => {
                if !err.is_cancelled() {
                    tracing::debug!(delta, error = %err, "History navigation failed, reverting");
                    self.inner.history.go(-delta);
                }
                Err(err)
            }
        }
    }

    pub fn before_each(&self, hook: ConfirmHook) -> GuardHandle {
        self.inner.guards.add_before_each(hook)
    }

    pub fn after_each(&self, hook: NotifyHook) -> GuardHandle {
        self.inner.guards.add_after_each(hook)
    }

    /// Abort the in-flight navigation, drop every guard and tear down the
    /// micro-app. Idempotent.
    pub fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.transition.abort();
        self.inner.guards.clear();
        if let Some(app) = &self.inner.micro_app {
            app.destroy();
        }
        tracing::debug!(base = %self.base(), "Router destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::Acquire)
    }

    pub fn resolver(&self) -> &RouteResolver {
        &self.inner.resolver
    }

    pub fn transition(&self) -> &Transition {
        &self.inner.transition
    }

    pub fn guards(&self) -> &Arc<GuardRegistry> {
        &self.inner.guards
    }

    pub fn history(&self) -> &Arc<dyn History> {
        &self.inner.history
    }

    pub fn fallback(&self) -> &FallbackHook {
        &self.inner.fallback
    }

    pub fn location_handler(&self) -> Option<&Arc<dyn LocationHandler>> {
        self.inner.location.as_ref()
    }

    pub fn response(&self) -> Option<&ResponseSlot> {
        self.inner.response.as_ref()
    }

    pub fn micro_app(&self) -> Option<&Arc<dyn MicroApp>> {
        self.inner.micro_app.as_ref()
    }

    pub fn scroll(&self) -> &ScrollManager {
        &self.inner.scroll
    }

    pub fn max_redirects(&self) -> usize {
        self.inner.max_redirects
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("base", &self.base().as_str())
            .field("current", &self.route().map(|r| r.url().to_string()))
            .field("destroyed", &self.is_destroyed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteConfig;

    #[test]
    fn test_invalid_pattern_fails() {
        let result = Router::new(RouterOptions::new(vec![RouteConfig::new("/a/:")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_new_compiles_option_routes() {
        let options = RouterOptions::new(vec![
            RouteConfig::new("/a"),
            RouteConfig::new("/b").children(vec![RouteConfig::new(":id")]),
        ])
        .max_redirects(3);
        let router = Router::new(options).unwrap();
        assert_eq!(router.max_redirects(), 3);
        assert_eq!(router.resolve("/b/7", RouteType::Push).matched().len(), 2);
        assert!(router.resolve("/c", RouteType::Push).matched().is_empty());
    }

    #[test]
    fn test_resolve_does_not_navigate() {
        let router = Router::new(
            RouterOptions::new(vec![RouteConfig::new("/about")]).base("https://site.test/docs/"),
        )
        .unwrap();
        let route = router.resolve("/about", RouteType::Push);
        assert_eq!(route.url().as_str(), "https://site.test/docs/about");
        assert_eq!(route.matched().len(), 1);
        assert!(router.route().is_none());
    }

    #[test]
    fn test_handle_is_status_gated() {
        use crate::error::HandleError;
        use crate::route::RouteStatus;
        use crate::transition::RouteHandle;

        let router = Router::new(RouterOptions::new(vec![RouteConfig::new("/")])).unwrap();
        let route = router.resolve("/", RouteType::Push);
        route.set_handle(RouteHandle::new(|_, _, _| Ok(serde_json::Value::from("done"))));

        assert!(matches!(
            route.invoke_handle(None, &router),
            Err(HandleError::NotReady {
                status: RouteStatus::Resolve
            })
        ));
        assert!(route.has_handle());

        route.set_status(RouteStatus::Success);
        assert_eq!(route.invoke_handle(None, &router).unwrap(), "done");
        assert!(matches!(
            route.invoke_handle(None, &router),
            Err(HandleError::Consumed)
        ));
    }

    #[tokio::test]
    async fn test_destroyed_router_fails_fast() {
        let router = Router::new(RouterOptions::new(vec![RouteConfig::new("/")])).unwrap();
        router.destroy();
        router.destroy();
        assert!(matches!(router.push("/").await, Err(NavigationError::Destroyed)));
        assert!(matches!(router.back().await, Err(NavigationError::Destroyed)));
    }
}
