//! Commit handlers, one per navigation type.
//!
//! A handler is what the `confirm` stage hands back as the route's commit
//! handle. It is the only place a navigation mutates history, the current
//! route, the micro-app or the scroll position.

use std::sync::Arc;

use serde_json::Value;

use crate::route::{Route, RouteType};
use crate::router::Router;
use crate::transition::RouteHandle;

pub(crate) fn commit_handle(route_type: RouteType) -> RouteHandle {
    match route_type {
        RouteType::Push => RouteHandle::new(push),
        RouteType::Replace => RouteHandle::new(replace),
        RouteType::RestartApp => RouteHandle::new(restart_app),
        RouteType::Back | RouteType::Go | RouteType::Forward => RouteHandle::new(history_move),
        RouteType::Unknown => RouteHandle::new(unknown),
        // `none` runs no stages, so this handle is never installed.
        RouteType::None => RouteHandle::new(unknown),
        RouteType::PushWindow | RouteType::ReplaceWindow | RouteType::PushLayer => {
            RouteHandle::new(delegate)
        }
    }
}

fn push(to: &Arc<Route>, _from: Option<&Arc<Route>>, router: &Router) -> anyhow::Result<Value> {
    let state = router.history().push(to.state(), to.url());
    to.set_state(state);
    activate(to, router, false);
    reset_scroll(to, router);
    Ok(Value::Null)
}

fn replace(to: &Arc<Route>, _from: Option<&Arc<Route>>, router: &Router) -> anyhow::Result<Value> {
    let state = router.history().replace(to.state(), to.url());
    to.set_state(state);
    activate(to, router, false);
    reset_scroll(to, router);
    Ok(Value::Null)
}

fn restart_app(
    to: &Arc<Route>,
    _from: Option<&Arc<Route>>,
    router: &Router,
) -> anyhow::Result<Value> {
    let state = router.history().replace(to.state(), to.url());
    to.set_state(state);
    activate(to, router, true);
    reset_scroll(to, router);
    Ok(Value::Null)
}

// History already moved before the pipeline ran.
fn history_move(
    to: &Arc<Route>,
    _from: Option<&Arc<Route>>,
    router: &Router,
) -> anyhow::Result<Value> {
    activate(to, router, false);
    if !to.keep_scroll_position() {
        router.scroll().restore(to.url());
    }
    Ok(Value::Null)
}

fn unknown(to: &Arc<Route>, _from: Option<&Arc<Route>>, router: &Router) -> anyhow::Result<Value> {
    activate(to, router, false);
    Ok(Value::Null)
}

fn delegate(to: &Arc<Route>, from: Option<&Arc<Route>>, router: &Router) -> anyhow::Result<Value> {
    router.fallback().call(to, from, router)
}

fn activate(to: &Arc<Route>, router: &Router, force: bool) {
    router.transition().set_current(to.clone());
    if let Some(app) = router.micro_app() {
        app.update(to, force);
    }
}

fn reset_scroll(to: &Arc<Route>, router: &Router) {
    if !to.keep_scroll_position() {
        router.scroll().reset();
    }
}
