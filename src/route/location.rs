//! Navigation targets and URL normalization.
//!
//! # Responsibilities
//! - Describe a navigation target (`RouteLocation`)
//! - Turn a location into an absolute URL against the router base
//!
//! # Design Decisions
//! - Paths starting with `/` are relative to the base path, not the origin
//! - Protocol-relative URLs (`//host/x`) take the base scheme
//! - Location query entries replace same-named keys already in the URL

use std::collections::BTreeMap;

use serde_json::Value;
use url::Url;

use crate::routing::Params;
use crate::transition::ConfirmHook;

/// Caller-supplied navigation state and route metadata.
pub type StateMap = serde_json::Map<String, Value>;

/// Where a location points: a path/relative reference or an absolute URL.
#[derive(Debug, Clone)]
pub enum LocationTarget {
    Path(String),
    Url(Url),
}

impl Default for LocationTarget {
    fn default() -> Self {
        Self::Path(String::new())
    }
}

/// Navigation input: a target plus everything that travels with it.
#[derive(Debug, Clone, Default)]
pub struct RouteLocation {
    pub target: LocationTarget,

    /// Query values by key. Keys listed here replace the URL's own.
    pub query: BTreeMap<String, Vec<String>>,

    /// Params substituted into the matched route's path.
    pub params: Params,

    pub hash: Option<String>,

    pub state: StateMap,

    /// HTTP status hint used when the navigation ends in a server redirect.
    pub status_code: Option<u16>,

    pub keep_scroll_position: bool,

    /// Per-navigation hook run by the `confirm` stage.
    pub confirm: Option<ConfirmHook>,
}

impl RouteLocation {
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            target: LocationTarget::Path(path.into()),
            ..Default::default()
        }
    }

    pub fn url(url: Url) -> Self {
        Self {
            target: LocationTarget::Url(url),
            ..Default::default()
        }
    }

    /// Target as text, for logging and comparisons in tests.
    pub fn target_str(&self) -> &str {
        match &self.target {
            LocationTarget::Path(path) => path,
            LocationTarget::Url(url) => url.as_str(),
        }
    }

    /// Append one query value.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Set every value of one query key.
    #[must_use]
    pub fn with_query_values<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.query
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    #[must_use]
    pub fn with_state(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.state.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_state_map(mut self, state: StateMap) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    #[must_use]
    pub fn keep_scroll_position(mut self) -> Self {
        self.keep_scroll_position = true;
        self
    }

    #[must_use]
    pub fn with_confirm(mut self, hook: ConfirmHook) -> Self {
        self.confirm = Some(hook);
        self
    }
}

impl From<&str> for RouteLocation {
    fn from(path: &str) -> Self {
        Self::path(path)
    }
}

impl From<String> for RouteLocation {
    fn from(path: String) -> Self {
        Self::path(path)
    }
}

impl From<&String> for RouteLocation {
    fn from(path: &String) -> Self {
        Self::path(path.as_str())
    }
}

impl From<Url> for RouteLocation {
    fn from(url: Url) -> Self {
        Self::url(url)
    }
}

impl From<&Url> for RouteLocation {
    fn from(url: &Url) -> Self {
        Self::url(url.clone())
    }
}

/// Resolve a textual reference against the router base.
pub fn normalize_url(input: &str, base: &Url) -> Url {
    let resolved = if let Some(rest) = input.strip_prefix("//") {
        Url::parse(&format!("{}://{}", base.scheme(), rest))
    } else if input.starts_with('/') {
        let prefix = base.path().trim_end_matches('/');
        base.join(&format!("{prefix}{input}"))
    } else {
        match Url::parse(input) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => base.join(input),
            Err(err) => Err(err),
        }
    };

    resolved.unwrap_or_else(|err| {
        tracing::warn!(input = %input, error = %err, "Unparseable location, using base URL");
        base.clone()
    })
}

/// Build the absolute URL for a location: target, then query, then hash.
pub(crate) fn parse_location(location: &RouteLocation, base: &Url) -> Url {
    let mut url = match &location.target {
        LocationTarget::Path(path) => normalize_url(path, base),
        LocationTarget::Url(url) => url.clone(),
    };

    if !location.query.is_empty() {
        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .into_owned()
            .filter(|(key, _)| !location.query.contains_key(key))
            .collect();
        for (key, values) in &location.query {
            pairs.extend(values.iter().map(|v| (key.clone(), v.clone())));
        }
        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
    }

    if let Some(hash) = &location.hash {
        let hash = hash.trim_start_matches('#');
        url.set_fragment((!hash.is_empty()).then_some(hash));
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/app/").unwrap()
    }

    #[test]
    fn test_absolute_path_is_under_base() {
        let url = normalize_url("/user/1?tab=a#top", &base());
        assert_eq!(url.as_str(), "https://example.com/app/user/1?tab=a#top");
    }

    #[test]
    fn test_relative_and_external() {
        assert_eq!(
            normalize_url("settings", &base()).as_str(),
            "https://example.com/app/settings"
        );
        assert_eq!(
            normalize_url("https://other.org/x", &base()).as_str(),
            "https://other.org/x"
        );
        assert_eq!(
            normalize_url("//cdn.example.com/a", &base()).as_str(),
            "https://cdn.example.com/a"
        );
        assert_eq!(normalize_url("", &base()).as_str(), "https://example.com/app/");
    }

    #[test]
    fn test_location_query_replaces_keys() {
        let location = RouteLocation::path("/list?page=1&sort=asc")
            .with_query("page", "2")
            .with_query_values("tag", ["a", "b"]);
        let url = parse_location(&location, &base());
        assert_eq!(
            url.as_str(),
            "https://example.com/app/list?sort=asc&page=2&tag=a&tag=b"
        );
    }

    #[test]
    fn test_location_hash() {
        let location = RouteLocation::path("/doc#old").with_hash("#new");
        let url = parse_location(&location, &base());
        assert_eq!(url.fragment(), Some("new"));
    }
}
