//! Route configuration records.
//!
//! `RouteConfig` is the application-owned description of one route: its path
//! pattern, component, per-route hooks, metadata and nested children. The
//! core never mutates it; `RouteTable::compile` turns a tree of configs into
//! shared `MatchedRoute`s.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::route::StateMap;
use crate::transition::ConfirmHook;

/// Opaque component value. Rendering is outside this crate, so the router
/// only stores and hands back whatever the application registered.
pub type Component = Arc<dyn Any + Send + Sync>;

type LoaderFn = dyn Fn() -> BoxFuture<'static, anyhow::Result<Option<Component>>> + Send + Sync;

/// Lazy component loader. Resolving to `None` means "no valid component".
#[derive(Clone)]
pub struct ComponentLoader(Arc<LoaderFn>);

impl ComponentLoader {
    pub fn new<F, Fut>(loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<Component>>> + Send + 'static,
    {
        Self(Arc::new(move || loader().boxed()))
    }

    pub(crate) fn load(&self) -> BoxFuture<'static, anyhow::Result<Option<Component>>> {
        (self.0)()
    }
}

impl fmt::Debug for ComponentLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ComponentLoader(..)")
    }
}

/// Route definition supplied by the application.
#[derive(Clone, Default)]
pub struct RouteConfig {
    /// Path pattern, relative to the parent route for children.
    pub path: String,

    /// Micro-app key used by the mounted `MicroApp`.
    pub app: Option<String>,

    /// Component available without loading.
    pub component: Option<Component>,

    /// Loader run by the `async_component` stage when `component` is unset.
    pub async_component: Option<ComponentLoader>,

    pub before_enter: Option<ConfirmHook>,
    pub before_update: Option<ConfirmHook>,
    pub before_leave: Option<ConfirmHook>,

    /// Lets the route substitute its own navigation result.
    pub override_with: Option<ConfirmHook>,

    /// Arbitrary metadata, copied onto every resolved `Route`.
    pub meta: StateMap,

    pub children: Vec<RouteConfig>,
}

impl RouteConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    #[must_use]
    pub fn component<C: Any + Send + Sync>(mut self, component: C) -> Self {
        self.component = Some(Arc::new(component));
        self
    }

    #[must_use]
    pub fn async_component(mut self, loader: ComponentLoader) -> Self {
        self.async_component = Some(loader);
        self
    }

    #[must_use]
    pub fn before_enter(mut self, hook: ConfirmHook) -> Self {
        self.before_enter = Some(hook);
        self
    }

    #[must_use]
    pub fn before_update(mut self, hook: ConfirmHook) -> Self {
        self.before_update = Some(hook);
        self
    }

    #[must_use]
    pub fn before_leave(mut self, hook: ConfirmHook) -> Self {
        self.before_leave = Some(hook);
        self
    }

    #[must_use]
    pub fn override_with(mut self, hook: ConfirmHook) -> Self {
        self.override_with = Some(hook);
        self
    }

    #[must_use]
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn children(mut self, children: Vec<RouteConfig>) -> Self {
        self.children = children;
        self
    }
}

impl fmt::Debug for RouteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteConfig")
            .field("path", &self.path)
            .field("app", &self.app)
            .field("component", &self.component.is_some())
            .field("async_component", &self.async_component.is_some())
            .field("meta", &self.meta)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}
