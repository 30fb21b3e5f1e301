//! Scoped subscriptions to the root pointer event stream.
//!
//! The hub stands in for the document-level listening surface. A
//! [`PointerSubscription`] is registered for as long as it is alive;
//! dropping it deregisters it on every exit path.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, &'static str)>,
}

/// Root listening surface shared by one widget instance.
#[derive(Debug, Clone, Default)]
pub struct PointerHub {
    registry: Rc<RefCell<Registry>>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener owned by `owner`.
    pub fn subscribe(&self, owner: &'static str) -> PointerSubscription {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push((id, owner));
        trace!(id, owner, count = registry.listeners.len(), "pointer listener attached");
        PointerSubscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    /// Whether pointer events need to be routed at all.
    pub fn has_listeners(&self) -> bool {
        self.listener_count() > 0
    }

    #[cfg(test)]
    pub(crate) fn owners(&self) -> Vec<&'static str> {
        self.registry.borrow().listeners.iter().map(|(_, owner)| *owner).collect()
    }
}

/// Live registration on a [`PointerHub`]; deregisters on drop.
#[derive(Debug)]
pub struct PointerSubscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl PointerSubscription {
    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let registered = registry.borrow().listeners.iter().any(|(id, _)| *id == self.id);
        registered
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.borrow_mut();
            registry.listeners.retain(|(id, _)| *id != self.id);
            trace!(id = self.id, count = registry.listeners.len(), "pointer listener detached");
        }
    }
}
