//! Location → `Route` resolution.
//!
//! # Responsibilities
//! - Turn a `RouteLocation` into an absolute URL under the router base
//! - Gate the matcher on origin and base prefix
//! - Splice caller params into the matched path
//! - Derive `path`, `full_path`, `query` and `query_array`

use std::collections::BTreeMap;
use std::sync::Arc;

use url::Url;

use crate::route::location::parse_location;
use crate::route::route::{Route, RouteParts, RouteType};
use crate::route::RouteLocation;
use crate::routing::{Params, RouteMatch, RouteTable};
use crate::transition::NormalizeUrl;

/// Everything needed to build routes: base, table, optional URL hook.
#[derive(Debug, Clone)]
pub struct RouteResolver {
    base: Url,
    table: RouteTable,
    normalize_url: Option<NormalizeUrl>,
}

impl RouteResolver {
    pub fn new(base: Url, table: RouteTable, normalize_url: Option<NormalizeUrl>) -> Self {
        Self {
            base,
            table,
            normalize_url,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Base-relative pathname, or `None` when `url` is outside the base.
    pub fn relative_path(&self, url: &Url) -> Option<String> {
        if url.origin() != self.base.origin() {
            return None;
        }
        let prefix = self.base.path().trim_end_matches('/');
        let rest = url.path().strip_prefix(prefix)?;
        if rest.is_empty() {
            Some("/".to_string())
        } else if rest.starts_with('/') {
            Some(rest.to_string())
        } else {
            None
        }
    }

    pub fn resolve(
        &self,
        route_type: RouteType,
        location: &RouteLocation,
        from_url: Option<&Url>,
        redirected_from: Option<Arc<Route>>,
    ) -> Route {
        let mut url = parse_location(location, &self.base);
        if let Some(hook) = &self.normalize_url {
            url = hook.call(url, from_url);
        }

        let mut matched = Vec::new();
        let mut params = Params::new();

        if let Some(relative) = self.relative_path(&url) {
            if let Some(RouteMatch { matches, params: found }) = self.table.match_path(&relative) {
                params = found;
                if !location.params.is_empty() {
                    params.extend(location.params.clone());
                    if let Some(leaf) = matches.last() {
                        match leaf.compile_with(&params) {
                            Ok(compiled) => splice_path(&mut url, &self.base, &compiled),
                            Err(err) => tracing::warn!(
                                route = %leaf.compile_path(),
                                error = %err,
                                "Failed to compile route params"
                            ),
                        }
                    }
                }
                matched = matches;
            }
        }

        let path = self
            .relative_path(&url)
            .unwrap_or_else(|| url.path().to_string());
        let mut full_path = path.clone();
        if let Some(query) = url.query() {
            full_path.push('?');
            full_path.push_str(query);
        }
        if let Some(fragment) = url.fragment() {
            full_path.push('#');
            full_path.push_str(fragment);
        }

        let mut query = BTreeMap::new();
        let mut query_array: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in url.query_pairs().into_owned() {
            query.entry(key.clone()).or_insert_with(|| value.clone());
            query_array.entry(key).or_default().push(value);
        }

        Route::from_parts(RouteParts {
            route_type,
            url,
            path,
            full_path,
            matched,
            params,
            query,
            query_array,
            state: location.state.clone(),
            status_code: location.status_code,
            keep_scroll_position: location.keep_scroll_position,
            confirm: location.confirm.clone(),
            redirected_from,
        })
    }
}

impl Route {
    /// Build a route for one navigation attempt.
    pub fn new(
        resolver: &RouteResolver,
        route_type: RouteType,
        location: &RouteLocation,
        from_url: Option<&Url>,
        redirected_from: Option<Arc<Route>>,
    ) -> Self {
        resolver.resolve(route_type, location, from_url, redirected_from)
    }
}

/// Overwrite the leading segments of `url`'s path with the compiled route
/// path (joined onto the base). Segments past the compiled path are kept.
fn splice_path(url: &mut Url, base: &Url, compiled: &str) {
    let prefix = base.path().trim_end_matches('/');
    let target = format!("{prefix}{compiled}");

    let mut segments: Vec<String> = url.path().split('/').map(str::to_string).collect();
    for (i, segment) in target.split('/').enumerate() {
        match segments.get_mut(i) {
            Some(existing) => *existing = segment.to_string(),
            None => segments.push(segment.to_string()),
        }
    }
    url.set_path(&segments.join("/"));
}
