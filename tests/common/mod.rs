//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::Value;
use url::Url;
use wayfinder::history::{ScrollAdapter, ScrollPosition};
use wayfinder::router::{LocationHandler, MicroApp};
use wayfinder::{ConfirmHook, MemoryHistory, Route, RouteConfig, RouteType, Router, RouterOptions};

/// Ordered log of hook invocations.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Hook that records `label` and lets the navigation continue.
pub fn recording_hook(recorder: &Recorder, label: &str) -> ConfirmHook {
    let recorder = recorder.clone();
    let label = label.to_string();
    ConfirmHook::new(move |_, _, _| {
        recorder.push(label.clone());
        async { Ok(()) }
    })
}

/// Hook that always answers `allow`.
pub fn gate(allow: bool) -> ConfirmHook {
    ConfirmHook::new(move |_, _, _| async move { Ok(allow) })
}

/// Hook that always redirects to `target`.
pub fn redirect_to(target: &str) -> ConfirmHook {
    let target = target.to_string();
    ConfirmHook::new(move |_, _, _| {
        let target = target.clone();
        async move { Ok(target) }
    })
}

pub fn options(routes: Vec<RouteConfig>) -> RouterOptions {
    RouterOptions::new(routes)
        .base("http://localhost/")
        .history(Arc::new(MemoryHistory::new()))
}

pub fn router(routes: Vec<RouteConfig>) -> Router {
    Router::new(options(routes)).unwrap()
}

pub fn path_of(route: &Route) -> String {
    route.path().to_string()
}

/// Micro-app that records its updates.
#[derive(Default)]
pub struct TestApp {
    pub updates: Mutex<Vec<(String, bool)>>,
    pub destroyed: Mutex<bool>,
}

impl MicroApp for TestApp {
    fn update(&self, route: &Arc<Route>, force: bool) {
        self.updates
            .lock()
            .unwrap()
            .push((route.full_path().to_string(), force));
    }

    fn destroy(&self) {
        *self.destroyed.lock().unwrap() = true;
    }
}

/// Browser-like location that records full navigations.
#[derive(Default)]
pub struct TestLocation {
    pub assigned: Mutex<Vec<(String, RouteType)>>,
}

impl LocationHandler for TestLocation {
    fn assign(&self, url: &Url, route_type: RouteType) -> anyhow::Result<Value> {
        self.assigned
            .lock()
            .unwrap()
            .push((url.to_string(), route_type));
        Ok(Value::from(url.as_str()))
    }
}

/// Viewport with a settable position.
#[derive(Default)]
pub struct Viewport(pub Mutex<ScrollPosition>);

impl Viewport {
    pub fn set_y(&self, y: f64) {
        self.0.lock().unwrap().y = y;
    }

    pub fn y(&self) -> f64 {
        self.0.lock().unwrap().y
    }
}

impl ScrollAdapter for Viewport {
    fn position(&self) -> ScrollPosition {
        *self.0.lock().unwrap()
    }

    fn scroll_to(&self, position: ScrollPosition) {
        *self.0.lock().unwrap() = position;
    }
}
