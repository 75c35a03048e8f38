//! Route and URL comparison.

use std::sync::Arc;

use url::Url;

use crate::route::Route;

/// How `is_route_matched` compares two routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Same leaf route config.
    Route,
    /// Same URL, ignoring query key order.
    Exact,
    /// The first route's full path starts with the second's.
    Include,
}

/// URL with its query pairs stably sorted by key. Pairs sharing a key keep
/// their relative order, so `a=1&a=2` and `a=2&a=1` stay distinct.
pub(crate) fn canonical_url(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    if pairs.is_empty() {
        let mut url = url.clone();
        url.set_query(None);
        return url.into();
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    let mut url = url.clone();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.into()
}

/// URL equality that ignores the order of distinct query keys.
pub fn is_url_equal(a: &Url, b: &Url) -> bool {
    a == b || canonical_url(a) == canonical_url(b)
}

pub fn is_route_matched(route: &Route, other: &Route, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Route => match (route.config(), other.config()) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        },
        MatchMode::Exact => is_url_equal(route.url(), other.url()),
        MatchMode::Include => route.full_path().starts_with(other.full_path()),
    }
}
