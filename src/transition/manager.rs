//! Transition manager.
//!
//! # Responsibilities
//! - Own the current route and the in-flight task controller
//! - Map every navigation type to its ordered stage list
//! - Drive one navigation: resolve, run the pipeline, commit, notify
//!
//! # Design Decisions
//! - Stage lists are built once, at construction
//! - Last writer wins: a new navigation aborts the previous controller
//! - `after_each` runs only for routes that committed

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwapOption;

use crate::error::HandleError;
use crate::route::{Interruption, Route, RouteLocation, RouteStatus, RouteType};
use crate::router::Router;
use crate::transition::stages::stage_task;
use crate::transition::{run_route_task, RouteTask, RouteTaskRun, TaskController, TaskName};

const FULL_STAGES: [TaskName; 8] = [
    TaskName::Fallback,
    TaskName::Override,
    TaskName::BeforeLeave,
    TaskName::BeforeEach,
    TaskName::BeforeUpdate,
    TaskName::BeforeEnter,
    TaskName::AsyncComponent,
    TaskName::Confirm,
];

const REDUCED_STAGES: [TaskName; 4] = [
    TaskName::Fallback,
    TaskName::Override,
    TaskName::BeforeEach,
    TaskName::Confirm,
];

/// Stage names run for a navigation type.
pub fn stages_for(route_type: RouteType) -> &'static [TaskName] {
    match route_type {
        RouteType::Push
        | RouteType::Replace
        | RouteType::RestartApp
        | RouteType::Back
        | RouteType::Go
        | RouteType::Forward
        | RouteType::Unknown => &FULL_STAGES,
        RouteType::PushWindow | RouteType::ReplaceWindow | RouteType::PushLayer => {
            &REDUCED_STAGES
        }
        RouteType::None => &[],
    }
}

pub struct Transition {
    stages: HashMap<RouteType, Vec<RouteTask>>,
    current: ArcSwapOption<Route>,
    controller: Mutex<Option<Arc<TaskController>>>,
}

impl Transition {
    pub fn new() -> Self {
        let stages = RouteType::ALL
            .iter()
            .map(|&route_type| {
                let tasks = stages_for(route_type)
                    .iter()
                    .map(|&name| stage_task(name))
                    .collect();
                (route_type, tasks)
            })
            .collect();

        Self {
            stages,
            current: ArcSwapOption::empty(),
            controller: Mutex::new(None),
        }
    }

    /// Last committed route.
    pub fn current(&self) -> Option<Arc<Route>> {
        self.current.load_full()
    }

    pub(crate) fn set_current(&self, route: Arc<Route>) {
        self.current.store(Some(route));
    }

    pub fn tasks(&self, route_type: RouteType) -> Vec<RouteTask> {
        self.stages.get(&route_type).cloned().unwrap_or_default()
    }

    /// Cancel the in-flight navigation, if any.
    pub fn abort(&self) {
        if let Some(controller) = self
            .controller
            .lock()
            .expect("transition controller mutex poisoned")
            .as_ref()
        {
            controller.abort();
        }
    }

    /// Navigate. The returned route's status and interruption tell whether
    /// and why the navigation did not commit.
    pub async fn to(
        &self,
        router: &Router,
        route_type: RouteType,
        location: RouteLocation,
    ) -> Arc<Route> {
        let from = self.current();
        let to = Arc::new(Route::new(
            router.resolver(),
            route_type,
            &location,
            from.as_ref().map(|route| route.url()),
            None,
        ));

        let controller = Arc::new(TaskController::new());
        let previous = self
            .controller
            .lock()
            .expect("transition controller mutex poisoned")
            .replace(controller.clone());
        if let Some(previous) = previous {
            previous.abort();
        }

        tracing::debug!(
            route_type = %route_type,
            url = %to.url(),
            matched = to.matched().len(),
            "Navigation started"
        );

        let route = run_route_task(RouteTaskRun {
            to,
            from: from.clone(),
            tasks: self.tasks(route_type),
            router: router.clone(),
            controller: Some(controller),
            max_redirects: router.max_redirects(),
        })
        .await;

        if route.status() == RouteStatus::Success && route.has_handle() {
            match route.invoke_handle(from.as_ref(), router) {
                Ok(_) => {
                    tracing::debug!(route_type = %route_type, url = %route.url(), "Navigation committed");
                    for hook in router.guards().after_each() {
                        hook.call(&route, from.as_ref(), router);
                    }
                }
                Err(err) => {
                    tracing::error!(url = %route.url(), error = %err, "Route commit failed");
                    let error = match err {
                        HandleError::Commit(error) => error,
                        other => Arc::new(anyhow::Error::new(other)),
                    };
                    route.interrupt(RouteStatus::Error, Interruption::CommitFailed { error });
                }
            }
        }

        route
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_table() {
        let transition = Transition::new();
        let names = |t: RouteType| -> Vec<TaskName> {
            transition.tasks(t).iter().map(|task| task.name).collect()
        };
        assert_eq!(names(RouteType::Push), FULL_STAGES.to_vec());
        assert_eq!(names(RouteType::Back), FULL_STAGES.to_vec());
        assert_eq!(names(RouteType::PushLayer), REDUCED_STAGES.to_vec());
        assert!(names(RouteType::None).is_empty());
    }
}
