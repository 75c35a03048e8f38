//! Router construction options.

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::history::{History, MemoryHistory, ScrollAdapter};
use crate::route::Route;
use crate::router::fallback::LocationHandler;
use crate::routing::RouteConfig;
use crate::server::redirect::ResponseSlot;
use crate::transition::{FallbackHook, NormalizeUrl};

pub const DEFAULT_BASE: &str = "http://localhost/";

pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Mounted application driven by the router.
pub trait MicroApp: Send + Sync {
    /// Re-render for `route`. `force` asks for a full restart.
    fn update(&self, route: &Arc<Route>, force: bool);

    fn destroy(&self);
}

pub struct RouterOptions {
    pub base: Option<String>,
    pub routes: Vec<RouteConfig>,
    pub history: Arc<dyn History>,
    pub normalize_url: Option<NormalizeUrl>,
    pub fallback: Option<FallbackHook>,
    pub location: Option<Arc<dyn LocationHandler>>,
    pub response: Option<ResponseSlot>,
    pub micro_app: Option<Arc<dyn MicroApp>>,
    pub scroll: Option<Arc<dyn ScrollAdapter>>,
    pub max_redirects: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            base: None,
            routes: Vec::new(),
            history: Arc::new(MemoryHistory::new()),
            normalize_url: None,
            fallback: None,
            location: None,
            response: None,
            micro_app: None,
            scroll: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl RouterOptions {
    pub fn new(routes: Vec<RouteConfig>) -> Self {
        Self {
            routes,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    #[must_use]
    pub fn history(mut self, history: Arc<dyn History>) -> Self {
        self.history = history;
        self
    }

    #[must_use]
    pub fn normalize_url(mut self, hook: NormalizeUrl) -> Self {
        self.normalize_url = Some(hook);
        self
    }

    #[must_use]
    pub fn fallback(mut self, hook: FallbackHook) -> Self {
        self.fallback = Some(hook);
        self
    }

    #[must_use]
    pub fn location(mut self, handler: Arc<dyn LocationHandler>) -> Self {
        self.location = Some(handler);
        self
    }

    #[must_use]
    pub fn response(mut self, slot: ResponseSlot) -> Self {
        self.response = Some(slot);
        self
    }

    #[must_use]
    pub fn micro_app(mut self, app: Arc<dyn MicroApp>) -> Self {
        self.micro_app = Some(app);
        self
    }

    #[must_use]
    pub fn scroll(mut self, adapter: Arc<dyn ScrollAdapter>) -> Self {
        self.scroll = Some(adapter);
        self
    }

    #[must_use]
    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }
}

impl fmt::Debug for RouterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterOptions")
            .field("base", &self.base)
            .field("routes", &self.routes.len())
            .field("response", &self.response.is_some())
            .field("max_redirects", &self.max_redirects)
            .finish_non_exhaustive()
    }
}

pub(crate) fn default_base() -> Url {
    Url::parse(DEFAULT_BASE).expect("default base URL is valid")
}

/// Parse the configured base. Paths are taken relative to the default
/// origin; anything unparseable falls back to the default with a warning.
pub fn parse_base(base: Option<&str>) -> Url {
    let Some(raw) = base.map(str::trim).filter(|b| !b.is_empty()) else {
        return default_base();
    };

    let parsed = if raw.starts_with('/') && !raw.starts_with("//") {
        default_base().join(raw)
    } else {
        Url::parse(raw)
    };

    match parsed {
        Ok(mut url) if !url.cannot_be_a_base() => {
            if !url.path().ends_with('/') {
                let path = format!("{}/", url.path());
                url.set_path(&path);
            }
            url.set_query(None);
            url.set_fragment(None);
            url
        }
        Ok(url) => {
            tracing::warn!(base = %url, default = DEFAULT_BASE, "Base URL cannot be a base, using default");
            default_base()
        }
        Err(err) => {
            tracing::warn!(base = %raw, error = %err, default = DEFAULT_BASE, "Invalid base URL, using default");
            default_base()
        }
    }
}
