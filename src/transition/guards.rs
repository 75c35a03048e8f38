//! Global guard registry (`before_each` / `after_each`).
//!
//! # Responsibilities
//! - Keep both guard lists in registration order
//! - Hand out snapshots so guards may register or unregister while running
//! - Remove guards by identity through idempotent handles

use std::sync::{Arc, Mutex, Weak};

use crate::transition::{ConfirmHook, NotifyHook};

#[derive(Debug, Default)]
struct Guards {
    before_each: Vec<ConfirmHook>,
    after_each: Vec<NotifyHook>,
}

/// Ordered `before_each` and `after_each` guards.
#[derive(Debug, Default)]
pub struct GuardRegistry {
    guards: Mutex<Guards>,
}

impl GuardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_before_each(self: &Arc<Self>, hook: ConfirmHook) -> GuardHandle {
        self.guards
            .lock()
            .expect("guard registry mutex poisoned")
            .before_each
            .push(hook.clone());
        GuardHandle::new(self, Guard::BeforeEach(hook))
    }

    pub fn add_after_each(self: &Arc<Self>, hook: NotifyHook) -> GuardHandle {
        self.guards
            .lock()
            .expect("guard registry mutex poisoned")
            .after_each
            .push(hook.clone());
        GuardHandle::new(self, Guard::AfterEach(hook))
    }

    /// Remove the first registration of `hook`. Returns whether one was found.
    pub fn remove_before_each(&self, hook: &ConfirmHook) -> bool {
        let mut guards = self.guards.lock().expect("guard registry mutex poisoned");
        match guards.before_each.iter().position(|h| h.ptr_eq(hook)) {
            Some(index) => {
                guards.before_each.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn remove_after_each(&self, hook: &NotifyHook) -> bool {
        let mut guards = self.guards.lock().expect("guard registry mutex poisoned");
        match guards.after_each.iter().position(|h| h.ptr_eq(hook)) {
            Some(index) => {
                guards.after_each.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn before_each(&self) -> Vec<ConfirmHook> {
        self.guards
            .lock()
            .expect("guard registry mutex poisoned")
            .before_each
            .clone()
    }

    pub fn after_each(&self) -> Vec<NotifyHook> {
        self.guards
            .lock()
            .expect("guard registry mutex poisoned")
            .after_each
            .clone()
    }

    pub fn clear(&self) {
        let mut guards = self.guards.lock().expect("guard registry mutex poisoned");
        guards.before_each.clear();
        guards.after_each.clear();
    }
}

#[derive(Debug)]
enum Guard {
    BeforeEach(ConfirmHook),
    AfterEach(NotifyHook),
}

/// Registration receipt. `unregister` removes exactly this registration,
/// once; dropping the handle keeps the guard registered.
#[derive(Debug)]
pub struct GuardHandle {
    registry: Weak<GuardRegistry>,
    guard: Mutex<Option<Guard>>,
}

impl GuardHandle {
    fn new(registry: &Arc<GuardRegistry>, guard: Guard) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            guard: Mutex::new(Some(guard)),
        }
    }

    pub fn unregister(&self) {
        let Some(guard) = self.guard.lock().expect("guard handle mutex poisoned").take() else {
            return;
        };
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        match guard {
            Guard::BeforeEach(hook) => registry.remove_before_each(&hook),
            Guard::AfterEach(hook) => registry.remove_after_each(&hook),
        };
    }
}
