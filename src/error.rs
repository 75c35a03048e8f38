//! Navigation and handle error definitions.

use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::route::{Interruption, Route, RouteStatus};
use crate::transition::TaskName;

/// Why a navigation call did not produce a committed route.
#[derive(Debug, Clone, Error)]
pub enum NavigationError {
    /// A newer navigation started before this one committed.
    #[error("Navigation to {} was cancelled by a newer navigation", .route.url())]
    Cancelled { route: Arc<Route> },

    /// A hook returned `false`.
    #[error("Navigation to {} was aborted in {task}", .route.url())]
    Aborted { route: Arc<Route>, task: TaskName },

    /// A hook failed.
    #[error("Navigation to {} failed in {task}: {error}", .route.url())]
    Task {
        route: Arc<Route>,
        task: TaskName,
        error: Arc<anyhow::Error>,
    },

    /// A hook redirected to the route it was guarding.
    #[error("Route {} redirected to itself", .route.url())]
    SelfRedirect { route: Arc<Route> },

    /// A redirect chain came back to a URL it already visited.
    #[error("Redirect loop at {} back to {url}", .route.url())]
    RedirectLoop { route: Arc<Route>, url: Url },

    /// Too many redirect hops.
    #[error("Redirect limit of {limit} exceeded at {}", .route.url())]
    RedirectLimit { route: Arc<Route>, limit: usize },

    /// The commit handle failed.
    #[error("Commit of {} failed: {error}", .route.url())]
    Commit {
        route: Arc<Route>,
        error: Arc<anyhow::Error>,
    },

    /// The router was destroyed.
    #[error("Router has been destroyed")]
    Destroyed,
}

impl NavigationError {
    pub(crate) fn from_interruption(route: Arc<Route>, interruption: Interruption) -> Self {
        match interruption {
            Interruption::Cancelled { .. } => Self::Cancelled { route },
            Interruption::Aborted { task } => Self::Aborted { route, task },
            Interruption::Failed { task, error } => Self::Task { route, task, error },
            Interruption::SelfRedirect => Self::SelfRedirect { route },
            Interruption::RedirectLoop { url } => Self::RedirectLoop { route, url },
            Interruption::RedirectLimit { limit } => Self::RedirectLimit { route, limit },
            Interruption::CommitFailed { error } => Self::Commit { route, error },
        }
    }

    /// The route the failed navigation ended at.
    pub fn route(&self) -> Option<&Arc<Route>> {
        match self {
            Self::Cancelled { route }
            | Self::Aborted { route, .. }
            | Self::Task { route, .. }
            | Self::SelfRedirect { route }
            | Self::RedirectLoop { route, .. }
            | Self::RedirectLimit { route, .. }
            | Self::Commit { route, .. } => Some(route),
            Self::Destroyed => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result type for navigation calls.
pub type NavigationResult<T> = Result<T, NavigationError>;

/// Misuse or failure of a route's commit handle.
#[derive(Debug, Clone, Error)]
pub enum HandleError {
    #[error("Route handle already invoked")]
    Consumed,

    #[error("Route handle invoked while route status is {status}")]
    NotReady { status: RouteStatus },

    #[error("Route has no handle")]
    Missing,

    #[error("Route handle failed: {0}")]
    Commit(Arc<anyhow::Error>),
}
