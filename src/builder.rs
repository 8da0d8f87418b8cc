//! Builder: validates the per-instance strategies and produces a `SeqMap`
//! by value, boxed, or placed into caller-owned storage.

use core::marker::PhantomData;

use crate::error::CreateError;
use crate::seq_map::{Entry, SeqMap};
use crate::sequence::{Sequence, SlotSequence};
use crate::strategy::{Destroy, Discard, Equality, Unset};

pub struct Builder<
    K,
    V,
    KE = Unset,
    VE = Unset,
    KD = Discard,
    VD = Discard,
    S = SlotSequence<Entry<K, V>>,
> {
    key_eq: Option<KE>,
    value_eq: Option<VE>,
    key_destroy: KD,
    value_destroy: VD,
    storage: S,
    _pd: PhantomData<fn(K, V)>,
}

impl<K, V> Builder<K, V> {
    pub fn new() -> Self {
        Self {
            key_eq: None,
            value_eq: None,
            key_destroy: Discard,
            value_destroy: Discard,
            storage: SlotSequence::new(),
            _pd: PhantomData,
        }
    }
}

impl<K, V> Default for Builder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, KE, VE, KD, VD> Builder<K, V, KE, VE, KD, VD> {
    /// Bound the stock storage to at most `limit` entries.
    pub fn capacity(mut self, limit: usize) -> Self {
        self.storage = SlotSequence::with_limit(limit);
        self
    }
}

impl<K, V, KE, VE, KD, VD, S> Builder<K, V, KE, VE, KD, VD, S> {
    pub fn key_eq<E>(self, eq: E) -> Builder<K, V, E, VE, KD, VD, S>
    where
        E: Equality<K>,
    {
        Builder {
            key_eq: Some(eq),
            value_eq: self.value_eq,
            key_destroy: self.key_destroy,
            value_destroy: self.value_destroy,
            storage: self.storage,
            _pd: PhantomData,
        }
    }

    pub fn value_eq<E>(self, eq: E) -> Builder<K, V, KE, E, KD, VD, S>
    where
        E: Equality<V>,
    {
        Builder {
            key_eq: self.key_eq,
            value_eq: Some(eq),
            key_destroy: self.key_destroy,
            value_destroy: self.value_destroy,
            storage: self.storage,
            _pd: PhantomData,
        }
    }

    pub fn key_destroy<D>(self, destroy: D) -> Builder<K, V, KE, VE, D, VD, S>
    where
        D: Destroy<K>,
    {
        Builder {
            key_eq: self.key_eq,
            value_eq: self.value_eq,
            key_destroy: destroy,
            value_destroy: self.value_destroy,
            storage: self.storage,
            _pd: PhantomData,
        }
    }

    pub fn value_destroy<D>(self, destroy: D) -> Builder<K, V, KE, VE, KD, D, S>
    where
        D: Destroy<V>,
    {
        Builder {
            key_eq: self.key_eq,
            value_eq: self.value_eq,
            key_destroy: self.key_destroy,
            value_destroy: destroy,
            storage: self.storage,
            _pd: PhantomData,
        }
    }

    /// Use caller-supplied storage instead of the stock `SlotSequence`.
    /// It must be empty when the map is built.
    pub fn storage<S2>(self, storage: S2) -> Builder<K, V, KE, VE, KD, VD, S2>
    where
        S2: Sequence<Entry<K, V>>,
    {
        Builder {
            key_eq: self.key_eq,
            value_eq: self.value_eq,
            key_destroy: self.key_destroy,
            value_destroy: self.value_destroy,
            storage,
            _pd: PhantomData,
        }
    }
}

impl<K, V, KE, VE, KD, VD, S> Builder<K, V, KE, VE, KD, VD, S>
where
    KE: Equality<K>,
    VE: Equality<V>,
    KD: Destroy<K>,
    VD: Destroy<V>,
    S: Sequence<Entry<K, V>>,
{
    pub fn build(self) -> Result<SeqMap<K, V, KE, VE, KD, VD, S>, CreateError> {
        let Some(key_eq) = self.key_eq else {
            log::debug!("seq_map: build refused, no key equality");
            return Err(CreateError::MissingKeyEquality);
        };
        #[cfg(feature = "contains-value")]
        if self.value_eq.is_none() {
            log::debug!("seq_map: build refused, no value equality");
            return Err(CreateError::MissingValueEquality);
        }
        if !self.storage.is_empty() {
            log::debug!(
                "seq_map: build refused, storage holds {} entries",
                self.storage.len()
            );
            return Err(CreateError::StorageNotEmpty);
        }
        Ok(SeqMap::from_parts(
            self.storage,
            key_eq,
            self.value_eq,
            self.key_destroy,
            self.value_destroy,
        ))
    }

    pub fn build_boxed(self) -> Result<Box<SeqMap<K, V, KE, VE, KD, VD, S>>, CreateError> {
        self.build().map(Box::new)
    }

    /// Build into caller-owned storage, replacing whatever it held. On
    /// failure `slot` is left untouched.
    pub fn build_in(
        self,
        slot: &mut Option<SeqMap<K, V, KE, VE, KD, VD, S>>,
    ) -> Result<&mut SeqMap<K, V, KE, VE, KD, VD, S>, CreateError> {
        let map = self.build()?;
        Ok(slot.insert(map))
    }
}
