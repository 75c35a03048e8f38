//! Built-in pipeline stages.
//!
//! Each stage is an ordinary `ConfirmHook`, so the pipeline cannot tell a
//! built-in stage from a user guard. Stages that run several hooks stop at
//! the first result that is not `Continue`.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use futures_util::future::try_join_all;

use crate::route::{is_url_equal, Route};
use crate::router::Router;
use crate::routing::MatchedRoute;
use crate::transition::handlers::commit_handle;
use crate::transition::{ConfirmHook, HookResult, RouteTask, TaskName};

/// Build the task for one stage.
pub fn stage_task(name: TaskName) -> RouteTask {
    let hook = match name {
        TaskName::Fallback => ConfirmHook::new(fallback),
        TaskName::Override => ConfirmHook::new(override_with),
        TaskName::BeforeLeave => ConfirmHook::new(before_leave),
        TaskName::BeforeEach => ConfirmHook::new(before_each),
        TaskName::BeforeUpdate => ConfirmHook::new(before_update),
        TaskName::BeforeEnter => ConfirmHook::new(before_enter),
        TaskName::AsyncComponent => ConfirmHook::new(async_component),
        TaskName::Confirm => ConfirmHook::new(confirm),
    };
    RouteTask::new(name, hook)
}

async fn run_hooks(
    hooks: Vec<ConfirmHook>,
    to: &Arc<Route>,
    from: Option<&Arc<Route>>,
    router: &Router,
) -> anyhow::Result<HookResult> {
    for hook in hooks {
        let result = hook.call(to, from, router).await?;
        if !result.is_continue() {
            return Ok(result);
        }
    }
    Ok(HookResult::Continue)
}

fn contains(chain: &[Arc<MatchedRoute>], route: &Arc<MatchedRoute>) -> bool {
    chain.iter().any(|r| Arc::ptr_eq(r, route))
}

async fn fallback(
    to: Arc<Route>,
    _from: Option<Arc<Route>>,
    _router: Router,
) -> anyhow::Result<HookResult> {
    if !to.matched().is_empty() {
        return Ok(HookResult::Continue);
    }
    Ok(HookResult::commit(|to, from, router| {
        router.fallback().call(to, from, router)
    }))
}

async fn override_with(
    to: Arc<Route>,
    from: Option<Arc<Route>>,
    router: Router,
) -> anyhow::Result<HookResult> {
    if from.is_none() {
        return Ok(HookResult::Continue);
    }
    match to.config().and_then(|leaf| leaf.override_with()) {
        Some(hook) => hook.call(&to, from.as_ref(), &router).await,
        None => Ok(HookResult::Continue),
    }
}

async fn before_leave(
    to: Arc<Route>,
    from: Option<Arc<Route>>,
    router: Router,
) -> anyhow::Result<HookResult> {
    let Some(leaving) = &from else {
        return Ok(HookResult::Continue);
    };
    let hooks: Vec<ConfirmHook> = leaving
        .matched()
        .iter()
        .rev()
        .filter(|route| !contains(to.matched(), route))
        .filter_map(|route| route.before_leave().cloned())
        .collect();
    run_hooks(hooks, &to, from.as_ref(), &router).await
}

async fn before_each(
    to: Arc<Route>,
    from: Option<Arc<Route>>,
    router: Router,
) -> anyhow::Result<HookResult> {
    let hooks = router.guards().before_each();
    run_hooks(hooks, &to, from.as_ref(), &router).await
}

async fn before_update(
    to: Arc<Route>,
    from: Option<Arc<Route>>,
    router: Router,
) -> anyhow::Result<HookResult> {
    let Some(current) = &from else {
        return Ok(HookResult::Continue);
    };
    let same_chain = current.matched().len() == to.matched().len()
        && current
            .matched()
            .iter()
            .zip(to.matched())
            .all(|(a, b)| Arc::ptr_eq(a, b));
    if !same_chain || is_url_equal(current.url(), to.url()) {
        return Ok(HookResult::Continue);
    }
    let hooks: Vec<ConfirmHook> = to
        .matched()
        .iter()
        .filter_map(|route| route.before_update().cloned())
        .collect();
    run_hooks(hooks, &to, from.as_ref(), &router).await
}

async fn before_enter(
    to: Arc<Route>,
    from: Option<Arc<Route>>,
    router: Router,
) -> anyhow::Result<HookResult> {
    let leaving: &[Arc<MatchedRoute>] = from.as_ref().map(|r| r.matched()).unwrap_or(&[]);
    let hooks: Vec<ConfirmHook> = to
        .matched()
        .iter()
        .filter(|route| !contains(leaving, route))
        .filter_map(|route| route.before_enter().cloned())
        .collect();
    run_hooks(hooks, &to, from.as_ref(), &router).await
}

async fn async_component(
    to: Arc<Route>,
    _from: Option<Arc<Route>>,
    _router: Router,
) -> anyhow::Result<HookResult> {
    let pending = to.matched().iter().filter_map(|route| {
        if route.component().is_some() {
            return None;
        }
        let loader = route.async_component()?.clone();
        let route = route.clone();
        Some(async move {
            let component = loader
                .load()
                .await
                .with_context(|| format!("failed to load component for {}", route.compile_path()))?
                .ok_or_else(|| anyhow!("component for {} resolved to nothing", route.compile_path()))?;
            route.set_component(component);
            Ok::<_, anyhow::Error>(())
        })
    });
    try_join_all(pending).await?;
    Ok(HookResult::Continue)
}

async fn confirm(
    to: Arc<Route>,
    from: Option<Arc<Route>>,
    router: Router,
) -> anyhow::Result<HookResult> {
    if let Some(hook) = to.confirm() {
        let result = hook.call(&to, from.as_ref(), &router).await?;
        if !result.is_continue() {
            return Ok(result);
        }
    }
    // `from` may be a redirected-away route that was never shown.
    if let Some(current) = router.route() {
        router.scroll().save(current.url());
    }
    Ok(HookResult::Commit(commit_handle(to.route_type())))
}
