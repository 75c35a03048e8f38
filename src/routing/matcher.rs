//! Route table compilation and lookup.
//!
//! # Responsibilities
//! - Compile a tree of `RouteConfig` into shared `MatchedRoute`s
//! - Resolve a URL (relative to the base) to a parent-first matched chain
//! - Extract path parameters from the deepest matching route
//!
//! # Design Decisions
//! - Routes compiled once, immutable afterwards (lazy components aside)
//! - Children are tried before their parent, so the deepest match wins
//! - First match wins among siblings (declaration order)
//! - Chain identity is `Arc` identity; stages compare chains by pointer

use std::fmt;
use std::sync::{Arc, RwLock};

use url::Url;

use crate::route::StateMap;
use crate::routing::pattern::{Params, PathPattern, PatternError};
use crate::routing::record::{Component, ComponentLoader, RouteConfig};
use crate::transition::ConfirmHook;

/// One compiled route config, shared by every `Route` that matches it.
pub struct MatchedRoute {
    path: String,
    compile_path: String,
    pattern: PathPattern,
    app: Option<String>,
    meta: StateMap,
    component: RwLock<Option<Component>>,
    async_component: Option<ComponentLoader>,
    before_enter: Option<ConfirmHook>,
    before_update: Option<ConfirmHook>,
    before_leave: Option<ConfirmHook>,
    override_with: Option<ConfirmHook>,
    children: Vec<Arc<MatchedRoute>>,
}

impl MatchedRoute {
    fn compile(config: RouteConfig, parent: &str) -> Result<Arc<Self>, PatternError> {
        let compile_path = join_path(parent, &config.path);
        let pattern = PathPattern::parse(&compile_path)?;
        let children = config
            .children
            .into_iter()
            .map(|child| Self::compile(child, &compile_path))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Arc::new(Self {
            path: config.path,
            compile_path,
            pattern,
            app: config.app,
            meta: config.meta,
            component: RwLock::new(config.component),
            async_component: config.async_component,
            before_enter: config.before_enter,
            before_update: config.before_update,
            before_leave: config.before_leave,
            override_with: config.override_with,
            children,
        }))
    }

    /// Path as declared in the config.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full path including every parent segment.
    pub fn compile_path(&self) -> &str {
        &self.compile_path
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Regenerate a concrete path from params.
    pub fn compile_with(&self, params: &Params) -> Result<String, PatternError> {
        self.pattern.compile(params)
    }

    pub fn app(&self) -> Option<&str> {
        self.app.as_deref()
    }

    pub fn meta(&self) -> &StateMap {
        &self.meta
    }

    /// Component, either declared or resolved by the `async_component` stage.
    pub fn component(&self) -> Option<Component> {
        self.component
            .read()
            .expect("route component lock poisoned")
            .clone()
    }

    pub(crate) fn set_component(&self, component: Component) {
        *self
            .component
            .write()
            .expect("route component lock poisoned") = Some(component);
    }

    pub fn async_component(&self) -> Option<&ComponentLoader> {
        self.async_component.as_ref()
    }

    pub fn before_enter(&self) -> Option<&ConfirmHook> {
        self.before_enter.as_ref()
    }

    pub fn before_update(&self) -> Option<&ConfirmHook> {
        self.before_update.as_ref()
    }

    pub fn before_leave(&self) -> Option<&ConfirmHook> {
        self.before_leave.as_ref()
    }

    pub fn override_with(&self) -> Option<&ConfirmHook> {
        self.override_with.as_ref()
    }

    pub fn children(&self) -> &[Arc<MatchedRoute>] {
        &self.children
    }
}

impl fmt::Debug for MatchedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchedRoute")
            .field("compile_path", &self.compile_path)
            .field("app", &self.app)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Matched chain, root first.
    pub matches: Vec<Arc<MatchedRoute>>,
    pub params: Params,
}

/// Compiled, immutable route table. Cloning shares the same routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    roots: Arc<Vec<Arc<MatchedRoute>>>,
}

impl RouteTable {
    pub fn compile(routes: Vec<RouteConfig>) -> Result<Self, PatternError> {
        let roots = routes
            .into_iter()
            .map(|route| MatchedRoute::compile(route, "/"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            roots: Arc::new(roots),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn roots(&self) -> &[Arc<MatchedRoute>] {
        &self.roots
    }

    /// Match `url` relative to `base`. The caller has already checked that
    /// both share an origin and that the URL lives under the base path.
    pub fn match_url(&self, url: &Url, base: &Url) -> Option<RouteMatch> {
        let prefix = base.path().trim_end_matches('/');
        let path = url.path().strip_prefix(prefix)?;
        let path = if path.is_empty() { "/" } else { path };
        self.match_path(path)
    }

    /// Match a base-relative pathname.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        let mut matches = Vec::new();
        let params = collect_matches(&self.roots, path, &mut matches)?;
        Some(RouteMatch { matches, params })
    }
}

fn collect_matches(
    routes: &[Arc<MatchedRoute>],
    path: &str,
    chain: &mut Vec<Arc<MatchedRoute>>,
) -> Option<Params> {
    for route in routes {
        if !route.children.is_empty() {
            if let Some(params) = collect_matches(&route.children, path, chain) {
                chain.insert(0, route.clone());
                return Some(params);
            }
        }
        if let Some(params) = route.pattern.matches(path) {
            chain.insert(0, route.clone());
            return Some(params);
        }
    }
    None
}

/// Join a child path onto its parent's compiled path.
fn join_path(parent: &str, path: &str) -> String {
    let segments: Vec<&str> = parent
        .split('/')
        .chain(path.split('/'))
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::compile(vec![
            RouteConfig::new("/"),
            RouteConfig::new("/user/:id").children(vec![
                RouteConfig::new(""),
                RouteConfig::new("posts/:post"),
            ]),
            RouteConfig::new("/settings").meta("title", "Settings"),
        ])
        .unwrap()
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/", "/"), "/");
        assert_eq!(join_path("/user/:id", "posts"), "/user/:id/posts");
        assert_eq!(join_path("/user/", "/posts/"), "/user/posts");
    }

    #[test]
    fn test_nested_match_is_parent_first() {
        let table = table();
        let m = table.match_path("/user/7/posts/hello").unwrap();
        let paths: Vec<&str> = m.matches.iter().map(|r| r.compile_path()).collect();
        assert_eq!(paths, vec!["/user/:id", "/user/:id/posts/:post"]);
        assert_eq!(m.params.get("id").map(String::as_str), Some("7"));
        assert_eq!(m.params.get("post").map(String::as_str), Some("hello"));
    }

    #[test]
    fn test_index_child_wins_over_parent() {
        let table = table();
        let m = table.match_path("/user/7").unwrap();
        assert_eq!(m.matches.len(), 2);
        assert_eq!(m.matches[1].path(), "");
    }

    #[test]
    fn test_no_match() {
        assert!(table().match_path("/missing").is_none());
    }

    #[test]
    fn test_match_shares_route_identity() {
        let table = table();
        let a = table.match_path("/settings").unwrap();
        let b = table.match_path("/settings/").unwrap();
        assert!(Arc::ptr_eq(&a.matches[0], &b.matches[0]));
        assert_eq!(a.matches[0].meta().get("title").unwrap(), "Settings");
    }

    #[test]
    fn test_match_url_strips_base() {
        let table = table();
        let base = Url::parse("http://example.com/app/").unwrap();
        let url = Url::parse("http://example.com/app/settings").unwrap();
        let m = table.match_url(&url, &base).unwrap();
        assert_eq!(m.matches[0].compile_path(), "/settings");

        let root = Url::parse("http://example.com/app/").unwrap();
        assert_eq!(table.match_url(&root, &base).unwrap().matches[0].compile_path(), "/");
    }

    #[test]
    fn test_invalid_child_pattern_fails_compile() {
        let result = RouteTable::compile(vec![
            RouteConfig::new("/a").children(vec![RouteConfig::new(":")]),
        ]);
        assert!(result.is_err());
    }
}
