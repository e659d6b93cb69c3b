//! Namespaced persistent settings with change notification.
//!
//! Every `set` is written through to the store before any watcher runs. While
//! updates are suspended (during a trial) writes still persist but watchers
//! are deferred; `resume_updates` then fires once per changed key with the
//! latest stored value.

mod attribute;
mod game;
mod storage;

pub use attribute::{AttrValue, Attribute, BooleanAttribute, NumericAttribute, StringAttribute};
pub use game::{sensitivity_scale, GameSettings, RecoilDisplay, TraceMode, NAMESPACE};
pub use storage::{KeyValueStore, MemoryStore, StorageError};

use tracing::debug;

type Watcher = Box<dyn FnMut(&str, &str)>;

pub struct Settings {
    store: Box<dyn KeyValueStore>,
    /// `None` watches every key.
    watchers: Vec<(Option<String>, Watcher)>,
    suspended: bool,
    /// Keys changed while suspended, in first-change order.
    pending: Vec<String>,
}

impl Settings {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            watchers: Vec::new(),
            suspended: false,
            pending: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    /// Writes `default` only if the key has never been stored. Does not notify.
    pub fn init(&mut self, key: &str, default: &str) -> Result<(), StorageError> {
        if self.store.get(key).is_none() {
            self.store.set(key, default)?;
        }
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store.set(key, value)?;
        if self.suspended {
            if !self.pending.iter().any(|k| k == key) {
                self.pending.push(key.to_string());
            }
            return Ok(());
        }
        self.notify(key, value);
        Ok(())
    }

    pub fn watch(&mut self, key: &str, mut f: impl FnMut(&str) + 'static) {
        self.watchers
            .push((Some(key.to_string()), Box::new(move |_, v| f(v))));
    }

    pub fn watch_all(&mut self, f: impl FnMut(&str, &str) + 'static) {
        self.watchers.push((None, Box::new(f)));
    }

    pub fn suspend_updates(&mut self) {
        self.suspended = true;
    }

    pub fn resume_updates(&mut self) {
        if !self.suspended {
            return;
        }
        self.suspended = false;
        let pending = std::mem::take(&mut self.pending);
        debug!(changed = pending.len(), "resuming settings updates");
        for key in pending {
            let value = self.store.get(&key).unwrap_or_default();
            self.notify(&key, &value);
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Notifies every watcher about every stored key. Used once at start-up
    /// to bring collaborators in sync with persisted values.
    pub fn poke_all(&mut self) {
        for key in self.store.keys() {
            let value = self.store.get(&key).unwrap_or_default();
            self.notify(&key, &value);
        }
    }

    fn notify(&mut self, key: &str, value: &str) {
        for (filter, watcher) in self.watchers.iter_mut() {
            if filter.as_deref().map_or(true, |f| f == key) {
                watcher(key, value);
            }
        }
    }
}
