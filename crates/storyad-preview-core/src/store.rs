//! Observable key/value store for state shared with the host UI.
//!
//! Listeners are notified after every `set` that changes a value. A
//! [`Subscription`] unregisters its listener when dropped.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::{Rc, Weak};

type Listener<K, V> = Rc<dyn Fn(&K, &V)>;

struct StoreInner<K, V> {
    values: HashMap<K, V>,
    listeners: Vec<(u64, Listener<K, V>)>,
    next_id: u64,
}

/// Single-threaded observable store.
///
/// Cloning yields another handle to the same store.
pub struct Store<K, V> {
    inner: Rc<RefCell<StoreInner<K, V>>>,
}

impl<K, V> Clone for Store<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for Store<K, V> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                values: HashMap::new(),
                listeners: Vec::new(),
                next_id: 0,
            })),
        }
    }
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash + Clone + 'static,
    V: PartialEq + Clone + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.borrow().values.get(key).cloned()
    }

    /// Store `value` under `key`, notifying listeners if it changed.
    ///
    /// Listeners run after the store is unlocked, so they may read or write it.
    pub fn set(&self, key: K, value: V) {
        let listeners: Vec<Listener<K, V>> = {
            let mut inner = self.inner.borrow_mut();
            if inner.values.get(&key) == Some(&value) {
                return;
            }
            inner.values.insert(key.clone(), value.clone());
            inner.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
        };
        for listener in listeners {
            listener(&key, &value);
        }
    }

    /// Register `listener` for every change.
    pub fn subscribe(&self, listener: impl Fn(&K, &V) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Rc::new(listener)));

        let weak: Weak<RefCell<StoreInner<K, V>>> = Rc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().listeners.retain(|(l, _)| *l != id);
                }
            })),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

/// Keeps a store listener registered until dropped.
#[must_use = "dropping a Subscription unregisters the listener"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unregister now. Equivalent to dropping.
    pub fn unsubscribe(mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// Keys the editor controller publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppliedKey {
    /// Text of the most recently rendered update.
    Content,
    /// Controller state name, or `error: ...` after a failed update.
    Status,
}

impl AppliedKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Status => "status",
        }
    }
}

pub type AppliedState = Store<AppliedKey, String>;

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn test_set_get() {
        let store: Store<&'static str, i32> = Store::new();
        assert_eq!(store.get(&"a"), None);
        store.set("a", 1);
        assert_eq!(store.get(&"a"), Some(1));
    }

    #[test]
    fn test_listener_sees_changes_only() {
        let store: AppliedState = Store::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in = Rc::clone(&seen);
        let _sub = store.subscribe(move |k, v| seen_in.borrow_mut().push((*k, v.clone())));

        store.set(AppliedKey::Status, "updating".into());
        store.set(AppliedKey::Status, "updating".into());
        store.set(AppliedKey::Status, "idle".into());

        assert_eq!(
            *seen.borrow(),
            [
                (AppliedKey::Status, "updating".to_string()),
                (AppliedKey::Status, "idle".to_string()),
            ]
        );
    }

    #[test]
    fn test_drop_unsubscribes() {
        let store: Store<u8, u8> = Store::new();
        let hits = Rc::new(RefCell::new(0));
        let hits_in = Rc::clone(&hits);
        let sub = store.subscribe(move |_, _| *hits_in.borrow_mut() += 1);
        assert_eq!(store.listener_count(), 1);

        store.set(1, 1);
        drop(sub);
        store.set(1, 2);

        assert_eq!(*hits.borrow(), 1);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_listener_may_write_store() {
        let store: Store<u8, u8> = Store::new();
        let handle = store.clone();
        let _sub = store.subscribe(move |k, v| {
            if *k == 0 {
                handle.set(1, *v + 1);
            }
        });
        store.set(0, 5);
        assert_eq!(store.get(&1), Some(6));
    }

    #[test]
    fn test_subscription_outlives_store() {
        let store: Store<u8, u8> = Store::new();
        let sub = store.subscribe(|_, _| {});
        drop(store);
        sub.unsubscribe();
    }
}
