//! Application-wide key listeners.
//!
//! Components that need to hear a key no matter where focus is (a dialog
//! waiting for Esc, say) subscribe here. The app broadcasts every key press
//! into the registry before routing it to the active view, and each
//! subscriber drains its own queue. Subscriptions are released explicitly
//! with [`KeyListeners::unsubscribe`].

use crossterm::event::{KeyCode, KeyEvent};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

#[derive(Debug)]
struct Listener {
    code: KeyCode,
    queue: Vec<KeyEvent>,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<ListenerId, Listener>,
}

/// Shared handle to the key listener registry. Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct KeyListeners {
    inner: Rc<RefCell<Registry>>,
}

impl KeyListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts listening for `code`.
    pub fn subscribe(&self, code: KeyCode) -> ListenerId {
        let mut registry = self.inner.borrow_mut();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.listeners.insert(
            id,
            Listener {
                code,
                queue: Vec::new(),
            },
        );
        id
    }

    /// Stops listening and drops anything still queued. Returns `false` if
    /// `id` was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().listeners.remove(&id).is_some()
    }

    /// Queues `key` for every listener waiting on its code and returns how
    /// many listeners received it.
    pub fn broadcast(&self, key: KeyEvent) -> usize {
        let mut registry = self.inner.borrow_mut();
        let mut delivered = 0;
        for listener in registry.listeners.values_mut() {
            if listener.code == key.code {
                listener.queue.push(key);
                delivered += 1;
            }
        }
        delivered
    }

    /// Takes every key queued for `id` since the last drain.
    pub fn drain(&self, id: ListenerId) -> Vec<KeyEvent> {
        self.inner
            .borrow_mut()
            .listeners
            .get_mut(&id)
            .map(|listener| std::mem::take(&mut listener.queue))
            .unwrap_or_default()
    }

    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.inner.borrow().listeners.contains_key(&id)
    }

    /// Number of live subscriptions.
    pub fn active(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}
