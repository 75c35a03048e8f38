//! Sequential task pipeline with redirects and cooperative cancellation.
//!
//! # Responsibilities
//! - Run a navigation's tasks in order against the target route
//! - Turn hook results into route status, handle, or a redirect hop
//! - Notice when a newer navigation superseded this one
//!
//! # Design Decisions
//! - Cancellation is checked around task boundaries only; a started task
//!   always runs to completion
//! - Redirects loop in place instead of recursing
//! - A failing hook is a hard stop: no further tasks, no redirect

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use url::Url;

use crate::route::compare::{canonical_url, is_url_equal};
use crate::route::{Interruption, Route, RouteStatus};
use crate::router::Router;
use crate::transition::{ConfirmHook, HookResult};

/// Pipeline stage names, in their canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskName {
    Fallback,
    Override,
    BeforeLeave,
    BeforeEach,
    BeforeUpdate,
    BeforeEnter,
    AsyncComponent,
    Confirm,
}

impl TaskName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskName::Fallback => "fallback",
            TaskName::Override => "override",
            TaskName::BeforeLeave => "before_leave",
            TaskName::BeforeEach => "before_each",
            TaskName::BeforeUpdate => "before_update",
            TaskName::BeforeEnter => "before_enter",
            TaskName::AsyncComponent => "async_component",
            TaskName::Confirm => "confirm",
        }
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named step of a pipeline.
#[derive(Debug, Clone)]
pub struct RouteTask {
    pub name: TaskName,
    pub hook: ConfirmHook,
}

impl RouteTask {
    pub fn new(name: TaskName, hook: ConfirmHook) -> Self {
        Self { name, hook }
    }
}

/// Generation counter shared between a navigation and whoever may cancel it.
#[derive(Debug, Default)]
pub struct TaskController {
    id: AtomicU64,
}

impl TaskController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> u64 {
        self.id.load(Ordering::Acquire)
    }

    /// Invalidate every run that captured the current id.
    pub fn abort(&self) {
        self.id.fetch_add(1, Ordering::AcqRel);
    }
}

/// Input of one pipeline run.
pub struct RouteTaskRun {
    pub to: Arc<Route>,
    pub from: Option<Arc<Route>>,
    pub tasks: Vec<RouteTask>,
    pub router: Router,
    pub controller: Option<Arc<TaskController>>,
    pub max_redirects: usize,
}

/// Run `tasks` against `to`, following redirects. Returns the route the
/// pipeline ended at; its status tells how.
pub async fn run_route_task(run: RouteTaskRun) -> Arc<Route> {
    let RouteTaskRun {
        mut to,
        mut from,
        tasks,
        router,
        controller,
        max_redirects,
    } = run;

    let captured = controller.as_ref().map(|c| c.id());
    let is_stale = || match (&controller, captured) {
        (Some(controller), Some(id)) => controller.id() != id,
        _ => false,
    };

    let from_url: Option<Url> = from.as_ref().map(|route| route.url().clone());
    let mut visited: HashSet<String> = HashSet::from([canonical_url(to.url())]);
    let mut hops = 0usize;

    'hop: loop {
        for task in &tasks {
            if is_stale() {
                return cancel(to, task.name);
            }

            let result = task.hook.call(&to, from.as_ref(), &router).await;

            if is_stale() {
                return cancel(to, task.name);
            }

            match result {
                Err(err) => {
                    tracing::error!(
                        task = %task.name,
                        url = %to.url(),
                        "[{}] route confirm hook error: {:#}",
                        task.name,
                        err
                    );
                    to.interrupt(
                        RouteStatus::Error,
                        Interruption::Failed {
                            task: task.name,
                            error: Arc::new(err),
                        },
                    );
                    return to;
                }
                Ok(HookResult::Continue) => {}
                Ok(HookResult::Abort) => {
                    tracing::debug!(task = %task.name, url = %to.url(), "Navigation aborted");
                    to.interrupt(RouteStatus::Aborted, Interruption::Aborted { task: task.name });
                    return to;
                }
                Ok(HookResult::Commit(handle)) => {
                    to.set_handle(handle);
                    to.set_status(RouteStatus::Success);
                    return to;
                }
                Ok(HookResult::Redirect(location)) => {
                    let next = Arc::new(Route::new(
                        router.resolver(),
                        to.route_type(),
                        &location,
                        from_url.as_ref(),
                        Some(to.clone()),
                    ));

                    if is_url_equal(next.url(), to.url()) {
                        tracing::error!(task = %task.name, url = %to.url(), "Route redirected to itself");
                        to.interrupt(RouteStatus::Error, Interruption::SelfRedirect);
                        return to;
                    }
                    if !visited.insert(canonical_url(next.url())) {
                        tracing::error!(
                            task = %task.name,
                            url = %to.url(),
                            target = %next.url(),
                            "Redirect loop detected"
                        );
                        to.interrupt(
                            RouteStatus::Error,
                            Interruption::RedirectLoop {
                                url: next.url().clone(),
                            },
                        );
                        return to;
                    }
                    hops += 1;
                    if hops > max_redirects {
                        tracing::error!(url = %to.url(), limit = max_redirects, "Redirect limit exceeded");
                        to.interrupt(
                            RouteStatus::Error,
                            Interruption::RedirectLimit {
                                limit: max_redirects,
                            },
                        );
                        return to;
                    }

                    tracing::debug!(
                        task = %task.name,
                        from = %to.url(),
                        to = %next.url(),
                        hop = hops,
                        "Navigation redirected"
                    );
                    from = Some(to);
                    to = next;
                    continue 'hop;
                }
            }
        }
        return to;
    }
}

fn cancel(to: Arc<Route>, task: TaskName) -> Arc<Route> {
    tracing::debug!(task = %task, url = %to.url(), "Navigation superseded");
    to.interrupt(RouteStatus::Aborted, Interruption::Cancelled { task });
    to
}
