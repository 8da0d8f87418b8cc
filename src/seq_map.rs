//! SeqMap: unique-key map over a single sequence of paired entries.

use core::marker::PhantomData;

use crate::error::{Busy, InsertError, RemoveError};
use crate::reentrancy::EntryGuard;
use crate::sequence::{Exhausted, Handle, Sequence, SlotSequence};
use crate::strategy::{Destroy, Discard, Equality, NaturalEq};

/// One key/value pair as stored in the underlying sequence.
#[derive(Debug)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

/// Key/value map with linear lookup.
///
/// Equality and cleanup are per-instance strategies; storage is any
/// [`Sequence`] of entries. Build one with [`crate::Builder`], or with
/// [`SeqMap::new`] when both key and value are `PartialEq`.
pub struct SeqMap<
    K,
    V,
    KE = NaturalEq,
    VE = NaturalEq,
    KD = Discard,
    VD = Discard,
    S = SlotSequence<Entry<K, V>>,
> {
    pub(crate) entries: S,
    pub(crate) key_eq: KE,
    #[cfg(feature = "contains-value")]
    pub(crate) value_eq: Option<VE>,
    pub(crate) key_destroy: KD,
    pub(crate) value_destroy: VD,
    pub(crate) guard: EntryGuard,
    // `VE` is only stored with `contains-value`.
    pub(crate) _pd: PhantomData<(K, V, fn() -> VE)>,
}

impl<K, V> SeqMap<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    pub fn new() -> Self {
        Self::from_parts(
            SlotSequence::new(),
            NaturalEq,
            Some(NaturalEq),
            Discard,
            Discard,
        )
    }
}

impl<K, V> Default for SeqMap<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, KE, VE, KD, VD, S> SeqMap<K, V, KE, VE, KD, VD, S>
where
    KE: Equality<K>,
    VE: Equality<V>,
    KD: Destroy<K>,
    VD: Destroy<V>,
    S: Sequence<Entry<K, V>>,
{
    pub(crate) fn from_parts(
        entries: S,
        key_eq: KE,
        value_eq: Option<VE>,
        key_destroy: KD,
        value_destroy: VD,
    ) -> Self {
        // Only `contains_value` reads the value equality.
        #[cfg(not(feature = "contains-value"))]
        let _ = value_eq;
        Self {
            entries,
            key_eq,
            #[cfg(feature = "contains-value")]
            value_eq,
            key_destroy,
            value_destroy,
            guard: EntryGuard::new(),
            _pd: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position_of(&self, key: &K) -> Option<usize> {
        self.entries.position(|e| self.key_eq.equals(&e.key, key))
    }

    /// Handle of the entry whose key equals `key`.
    pub fn find(&self, key: &K) -> Option<Handle> {
        let _g = self.guard.enter().ok()?;
        let pos = self.position_of(key)?;
        self.entries.handle_at(pos)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let _g = self.guard.enter().ok()?;
        let pos = self.position_of(key)?;
        self.entries.get(pos).map(|e| &e.value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        let Ok(_g) = self.guard.enter() else {
            return false;
        };
        self.position_of(key).is_some()
    }

    /// Whether any entry holds a value equal to `value`.
    ///
    /// Always `false` when the map was built without a value equality.
    #[cfg(feature = "contains-value")]
    pub fn contains_value(&self, value: &V) -> bool {
        let Some(value_eq) = self.value_eq.as_ref() else {
            return false;
        };
        let Ok(_g) = self.guard.enter() else {
            return false;
        };
        self.entries
            .position(|e| value_eq.equals(&e.value, value))
            .is_some()
    }

    pub fn handle_key(&self, h: Handle) -> Option<&K> {
        self.entries.get_handle(h).map(|e| &e.key)
    }

    pub fn handle_value(&self, h: Handle) -> Option<&V> {
        self.entries.get_handle(h).map(|e| &e.value)
    }

    /// Insert a new entry at the tail.
    ///
    /// Rejected keys and values are dropped without running the destroy
    /// callbacks; the map never took ownership of them.
    pub fn insert(&mut self, key: K, value: V) -> Result<Handle, InsertError> {
        let _g = self.guard.enter()?;
        if self.position_of(&key).is_some() {
            log::debug!("seq_map: insert rejected, duplicate key (len={})", self.len());
            return Err(InsertError::DuplicateKey);
        }
        match self.entries.try_append(Entry::new(key, value)) {
            Ok(h) => {
                log::trace!("seq_map: inserted entry (len={})", self.len());
                Ok(h)
            }
            Err(Exhausted(_rejected)) => {
                log::debug!("seq_map: insert rejected, storage exhausted (len={})", self.len());
                Err(InsertError::StorageExhausted)
            }
        }
    }

    /// Remove the entry for `key`, running both destroy callbacks.
    pub fn remove(&mut self, key: &K) -> Result<(), RemoveError> {
        let entry = {
            let _g = self.guard.enter()?;
            let Some(pos) = self.position_of(key) else {
                log::debug!("seq_map: remove of absent key (len={})", self.len());
                return Err(RemoveError::NotFound);
            };
            let Some(entry) = self.entries.remove_at(pos) else {
                log::debug!("seq_map: storage refused removal at {} (len={})", pos, self.len());
                return Err(RemoveError::StorageFailed);
            };
            entry
        };
        log::trace!("seq_map: removed entry (len={})", self.len());
        // Structure is consistent again; callbacks may re-enter.
        let (k, v) = entry.into_parts();
        self.key_destroy.destroy(k);
        self.value_destroy.destroy(v);
        Ok(())
    }

    /// Unlink the entry for `key` and return it without running the destroy
    /// callbacks.
    pub fn take(&mut self, key: &K) -> Option<(K, V)> {
        let _g = self.guard.enter().ok()?;
        let pos = self.position_of(key)?;
        let entry = self.entries.remove_at(pos)?;
        log::trace!("seq_map: took entry (len={})", self.len());
        Some(entry.into_parts())
    }

    /// Remove every entry, running both destroy callbacks per entry in
    /// insertion order. Returns how many entries were removed.
    pub fn clear(&mut self) -> Result<usize, Busy> {
        let drained = {
            let _g = self.guard.enter()?;
            self.entries.drain()
        };
        let n = drained.len();
        for entry in drained {
            let (k, v) = entry.into_parts();
            self.key_destroy.destroy(k);
            self.value_destroy.destroy(v);
        }
        log::trace!("seq_map: cleared {} entries", n);
        Ok(n)
    }

    /// Explicit teardown: destroy every remaining entry through the
    /// callbacks and release the map. A plain drop skips the callbacks.
    pub fn teardown(mut self) -> usize {
        self.clear().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Builder;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Invariant: duplicate keys are rejected and the map remains unchanged.
    #[test]
    fn duplicate_insert_rejected() {
        let mut m: SeqMap<String, i32> = SeqMap::new();
        let h = m.insert("dup".to_string(), 1).unwrap();
        match m.insert("dup".to_string(), 2) {
            Err(InsertError::DuplicateKey) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(m.handle_value(h), Some(&1));
        assert_eq!(m.get(&"dup".to_string()), Some(&1));
        assert_eq!(m.len(), 1);
    }

    /// Invariant: `find(k).is_some() == contains_key(k) == get(k).is_some()`.
    #[test]
    fn find_contains_get_parity() {
        let mut m: SeqMap<&'static str, i32> = SeqMap::new();
        for (i, k) in ["a", "b", "c"].iter().enumerate() {
            m.insert(*k, i as i32).unwrap();
        }
        for k in ["a", "b", "c"] {
            assert!(m.find(&k).is_some());
            assert!(m.contains_key(&k));
            assert!(m.get(&k).is_some());
        }
        for k in ["x", "y"] {
            assert!(m.find(&k).is_none());
            assert!(!m.contains_key(&k));
            assert!(m.get(&k).is_none());
        }
    }

    /// Invariant: the handle returned by insert is the one lookup finds, and it
    /// stops resolving once the entry is removed.
    #[test]
    fn handles_are_stable_and_invalidated_by_remove() {
        let mut m: SeqMap<u32, &'static str> = SeqMap::new();
        let h1 = m.insert(1, "one").unwrap();
        let h2 = m.insert(2, "two").unwrap();
        assert_eq!(m.find(&1), Some(h1));

        m.remove(&1).unwrap();
        assert!(m.handle_value(h1).is_none());
        // Removing an earlier entry shifts positions, not handles.
        assert_eq!(m.handle_key(h2), Some(&2));
        assert_eq!(m.find(&2), Some(h2));

        let h3 = m.insert(1, "uno").unwrap();
        assert_ne!(h1, h3, "stale handle must not alias a new entry");
        assert!(m.handle_value(h1).is_none());
        assert_eq!(m.handle_value(h3), Some(&"uno"));
    }

    /// Invariant: lookups go through the configured key equality, not `PartialEq`.
    #[test]
    fn custom_key_equality_drives_uniqueness_and_lookup() {
        let mut m = Builder::new()
            .key_eq(|a: &String, b: &String| a.eq_ignore_ascii_case(b))
            .value_eq(NaturalEq)
            .build()
            .unwrap();
        m.insert("Key".to_string(), 1).unwrap();
        assert_eq!(m.insert("KEY".to_string(), 2), Err(InsertError::DuplicateKey));
        assert_eq!(m.get(&"key".to_string()), Some(&1));
        assert_eq!(m.len(), 1);
    }

    /// Invariant: remove runs the key destroyer on the key and the value
    /// destroyer on the value, exactly once each; take runs neither.
    #[test]
    fn remove_runs_destroyers_take_does_not() {
        let keys = Rc::new(RefCell::new(Vec::new()));
        let values = Rc::new(Cell::new(0));
        let (kl, vl) = (keys.clone(), values.clone());
        let mut m = Builder::new()
            .key_eq(NaturalEq)
            .value_eq(NaturalEq)
            .key_destroy(move |k: String| kl.borrow_mut().push(k))
            .value_destroy(move |_v: i32| vl.set(vl.get() + 1))
            .build()
            .unwrap();

        m.insert("a".to_string(), 1).unwrap();
        m.insert("b".to_string(), 2).unwrap();

        m.remove(&"a".to_string()).unwrap();
        assert_eq!(*keys.borrow(), vec!["a".to_string()]);
        assert_eq!(values.get(), 1);

        assert_eq!(m.take(&"b".to_string()), Some(("b".to_string(), 2)));
        assert_eq!(keys.borrow().len(), 1);
        assert_eq!(values.get(), 1);
        assert!(m.is_empty());
    }

    /// Invariant: removing an absent key fails and runs no callbacks.
    #[test]
    fn remove_absent_key_fails_without_side_effects() {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let mut m = Builder::new()
            .key_eq(NaturalEq)
            .value_eq(NaturalEq)
            .value_destroy(move |_v: u8| c.set(c.get() + 1))
            .build()
            .unwrap();
        m.insert(1u8, 10u8).unwrap();
        assert_eq!(m.remove(&2), Err(RemoveError::NotFound));
        assert_eq!(m.len(), 1);
        assert_eq!(calls.get(), 0);
        assert_eq!(m.take(&2), None);
    }

    /// Invariant: clear destroys every entry in insertion order and reports the count;
    /// clearing an empty map is a trivial success.
    #[test]
    fn clear_destroys_in_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let l = order.clone();
        let mut m = Builder::new()
            .key_eq(NaturalEq)
            .value_eq(NaturalEq)
            .key_destroy(move |k: i32| l.borrow_mut().push(k))
            .build()
            .unwrap();
        for k in [3, 1, 2] {
            m.insert(k, ()).unwrap();
        }
        assert_eq!(m.clear(), Ok(3));
        assert_eq!(*order.borrow(), vec![3, 1, 2]);
        assert!(m.is_empty());
        assert_eq!(m.clear(), Ok(0));
    }

    /// Invariant: teardown runs the callbacks; a plain drop does not.
    #[test]
    fn teardown_versus_drop() {
        let count = Rc::new(Cell::new(0));
        let make = |count: Rc<Cell<i32>>| {
            let mut m = Builder::new()
                .key_eq(NaturalEq)
                .value_eq(NaturalEq)
                .key_destroy(move |_k: i32| count.set(count.get() + 1))
                .build()
                .unwrap();
            m.insert(1, 1).unwrap();
            m.insert(2, 2).unwrap();
            m
        };

        assert_eq!(make(count.clone()).teardown(), 2);
        assert_eq!(count.get(), 2);

        drop(make(count.clone()));
        assert_eq!(count.get(), 2);
    }

    /// Invariant (strict): re-entering from inside a key equality callback is
    /// refused with the failure sentinel and the outer operation completes.
    #[cfg(feature = "strict")]
    #[test]
    fn reentry_from_equality_is_refused() {
        type Guarded = SeqMap<u32, u32, fn(&u32, &u32) -> bool>;
        thread_local! {
            static MAP: Cell<*const Guarded> = Cell::new(core::ptr::null());
            static INNER: Cell<Option<bool>> = Cell::new(None);
        }
        fn reentrant_eq(a: &u32, b: &u32) -> bool {
            let p = MAP.with(|m| m.get());
            if !p.is_null() {
                // SAFETY: only reads through a shared reference while the outer
                // `&self` lookup is running.
                let m = unsafe { &*p };
                INNER.with(|i| i.set(Some(m.contains_key(a))));
            }
            a == b
        }

        let mut m: Guarded = Builder::new()
            .key_eq(reentrant_eq as fn(&u32, &u32) -> bool)
            .value_eq(NaturalEq)
            .build()
            .unwrap();
        m.insert(7, 70).unwrap();
        MAP.with(|c| c.set(&m as *const _));

        assert_eq!(m.get(&7), Some(&70));
        assert_eq!(INNER.with(|i| i.get()), Some(false));
        MAP.with(|c| c.set(core::ptr::null()));
    }

    /// Storage that keeps its elements but refuses to unlink any of them.
    struct PinnedSequence<T>(SlotSequence<T>);

    impl<T> Sequence<T> for PinnedSequence<T> {
        fn len(&self) -> usize {
            self.0.len()
        }
        fn try_append(&mut self, item: T) -> Result<Handle, Exhausted<T>> {
            self.0.try_append(item)
        }
        fn get(&self, position: usize) -> Option<&T> {
            self.0.get(position)
        }
        fn get_handle(&self, handle: Handle) -> Option<&T> {
            self.0.get_handle(handle)
        }
        fn handle_at(&self, position: usize) -> Option<Handle> {
            self.0.handle_at(position)
        }
        fn position<F>(&self, pred: F) -> Option<usize>
        where
            F: FnMut(&T) -> bool,
        {
            self.0.position(pred)
        }
        fn remove_at(&mut self, _position: usize) -> Option<T> {
            None
        }
        fn drain(&mut self) -> Vec<T> {
            self.0.drain()
        }
    }

    /// Invariant: when storage fails to unlink a found entry, remove reports
    /// it, runs no destroyer, and the entry stays reachable.
    #[test]
    fn remove_reports_storage_failure() {
        let destroyed = Rc::new(Cell::new(0));
        let (dk, dv) = (destroyed.clone(), destroyed.clone());
        let mut m = Builder::new()
            .key_eq(NaturalEq)
            .value_eq(NaturalEq)
            .key_destroy(move |_k: u32| dk.set(dk.get() + 1))
            .value_destroy(move |_v: &'static str| dv.set(dv.get() + 1))
            .storage(PinnedSequence(SlotSequence::new()))
            .build()
            .unwrap();
        let h = m.insert(1, "one").unwrap();

        assert_eq!(m.remove(&1), Err(RemoveError::StorageFailed));
        assert_eq!(destroyed.get(), 0);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(&1), Some(&"one"));
        assert_eq!(m.find(&1), Some(h));
        assert_eq!(m.remove(&2), Err(RemoveError::NotFound));
    }

    #[test]
    fn map_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<SeqMap<String, Vec<u8>>>();
    }
}
