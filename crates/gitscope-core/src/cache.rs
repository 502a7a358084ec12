//! Run-once async memoization.
//!
//! A [`SingleSlotCache`] remembers the outcome of the first computation it
//! was asked to run, success or failure, and hands that outcome to every
//! later caller. Callers that arrive while the computation is in flight
//! wait for it instead of starting their own. [`KeyedCache`] threads all
//! calls for one key through one such slot.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

use crate::error::{Error, Result};

/// Holds at most one computed outcome.
#[derive(Debug)]
pub struct SingleSlotCache<T> {
    cell: OnceCell<Result<T>>,
}

impl<T> Default for SingleSlotCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SingleSlotCache<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Whether an outcome has been stored.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.cell.initialized()
    }
}

impl<T: Clone> SingleSlotCache<T> {
    /// Return the stored outcome, running `supplier` first if the slot is empty.
    ///
    /// # Errors
    /// Returns the stored failure, which may come from an earlier supplier.
    pub async fn fetch<F, Fut>(&self, supplier: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.cell.get_or_init(supplier).await.clone()
    }

    /// The stored outcome, without computing anything.
    #[must_use]
    pub fn get(&self) -> Option<Result<T>> {
        self.cell.get().cloned()
    }

    /// Pre-seed the slot with a known value.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the slot is already populated or
    /// being computed.
    pub fn set(&self, value: T) -> Result<()> {
        self.cell
            .set(Ok(value))
            .map_err(|_| Error::validation("cache slot", "already populated"))
    }

    /// Pre-seed the slot unless it already holds (or is computing) an outcome.
    ///
    /// Returns whether `value` was stored.
    pub fn set_if_absent(&self, value: T) -> bool {
        self.cell.set(Ok(value)).is_ok()
    }
}

/// A map of keys to [`SingleSlotCache`]s.
///
/// The lock only guards slot creation; computations run outside it.
#[derive(Debug)]
pub struct KeyedCache<K, V> {
    slots: Mutex<HashMap<K, Arc<SingleSlotCache<V>>>>,
}

impl<K, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> KeyedCache<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot for `key`, created on first use.
    fn slot(&self, key: &K) -> Arc<SingleSlotCache<V>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get(key) {
            return Arc::clone(slot);
        }
        let slot = Arc::new(SingleSlotCache::new());
        slots.insert(key.clone(), Arc::clone(&slot));
        slot
    }

    /// Return the outcome stored for `key`, computing it if needed.
    ///
    /// # Errors
    /// Returns the stored failure for `key`.
    pub async fn fetch<F, Fut>(&self, key: &K, supplier: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        self.slot(key).fetch(supplier).await
    }

    /// The outcome stored for `key`, without computing anything.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<Result<V>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).and_then(|slot| slot.get())
    }

    /// Pre-seed `key`.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if `key` already has an outcome.
    pub fn set(&self, key: &K, value: V) -> Result<()> {
        self.slot(key).set(value)
    }

    /// Pre-seed `key` unless it already has an outcome. Returns whether
    /// `value` was stored.
    pub fn set_if_absent(&self, key: &K, value: V) -> bool {
        self.slot(key).set_if_absent(value)
    }

    /// Number of keys with a slot, resolved or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
