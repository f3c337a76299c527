//! # IDs
//! Many things need an identity that outlives their position in a collection: layers survive
//! reordering and undo, surface contents need a cheap "has this changed" check. This is provided by
//! [`Id<T>`], a process-unique ID namespaced by the marker type `T`.
//!
//! `Id<Layer>` and `Id<Revision>` may share a numeric value, but are different types and never compare.

use std::{
    any::TypeId,
    collections::BTreeMap,
    marker::PhantomData,
    num::NonZeroU64,
    sync::atomic::{AtomicU64, Ordering},
};

// Next available raw ID per namespace.
// Only written when a namespace allocates for the first time, a handful of times per process.
static COUNTERS: parking_lot::RwLock<BTreeMap<TypeId, AtomicU64>> =
    parking_lot::const_rwlock(BTreeMap::new());

fn next_raw(namespace: TypeId) -> u64 {
    if let Some(counter) = COUNTERS.read().get(&namespace) {
        return counter.fetch_add(1, Ordering::Relaxed);
    }
    COUNTERS
        .write()
        .entry(namespace)
        .or_insert_with(|| AtomicU64::new(1))
        .fetch_add(1, Ordering::Relaxed)
}

/// ID that is guaranteed unique within this execution of the program, within the namespace `T`.
/// Not stable across runs - never persist these.
pub struct Id<T: 'static> {
    raw: NonZeroU64,
    // fn() -> T keeps the ID Send + Sync regardless of T, we never store a T.
    _namespace: PhantomData<fn() -> T>,
}

impl<T: 'static> Id<T> {
    /// Allocate a fresh ID.
    #[must_use]
    pub fn new() -> Self {
        let raw = next_raw(TypeId::of::<T>());
        let Some(raw) = NonZeroU64::new(raw) else {
            // Wrapped all the way around. Uniqueness is gone for good, nothing sane to continue with.
            log::error!("{} ID overflow! Aborting!", std::any::type_name::<T>());
            log::logger().flush();
            std::process::abort();
        };
        Self {
            raw,
            _namespace: PhantomData,
        }
    }
    /// The raw numeric value. IDs of different namespaces may share the same value!
    #[must_use]
    pub fn get(&self) -> u64 {
        self.raw.get()
    }
}

impl<T: 'static> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}
impl<T: 'static> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: 'static> Copy for Id<T> {}
impl<T: 'static> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}
impl<T: 'static> Eq for Id<T> {}
impl<T: 'static> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}
impl<T: 'static> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // rsplit always yields at least one item, even for an empty string.
        let name = std::any::type_name::<T>()
            .rsplit("::")
            .next()
            .unwrap_or_default();
        write!(f, "{name}#{}", self.raw)
    }
}
impl<T: 'static> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
