//! A shared value that can be swapped atomically and observed.

use std::sync::{Mutex, PoisonError, RwLock};

pub type Watcher<T> = Box<dyn Fn(&T, &T) + Send + Sync>;

/// Holds a value readable by any number of tasks and replaced by one writer
/// at a time. Registered watchers receive `(old, new)` for every update.
///
/// Watchers run after the value lock is released, so they may call
/// [`Atom::load`] and will observe the new value. Notifications are serialized
/// by the watcher list lock, taken before the swap: watchers see every update,
/// in the order the updates happened. A watcher must not call [`Atom::reset`]
/// or [`Atom::watch`] on the same atom.
pub struct Atom<T> {
    value: RwLock<T>,
    watchers: Mutex<Vec<Watcher<T>>>,
}

impl<T: Clone> Atom<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
            watchers: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of the current value.
    pub fn load(&self) -> T {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the current value, notifies the watchers and returns the previous value.
    pub fn reset(&self, value: T) -> T {
        let watchers = self.watchers.lock().unwrap_or_else(PoisonError::into_inner);
        let (old, new) = {
            let mut guard = self.value.write().unwrap_or_else(PoisonError::into_inner);
            let old = std::mem::replace(&mut *guard, value);
            (old, guard.clone())
        };
        for watcher in watchers.iter() {
            watcher(&old, &new);
        }
        old
    }

    pub fn watch<F>(&self, watcher: F)
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(watcher));
    }
}

impl<T: Clone + std::fmt::Debug> std::fmt::Debug for Atom<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Atom").field("value", &self.load()).finish()
    }
}
