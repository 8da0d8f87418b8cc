//! Sequence: the ordered, position-addressable storage a `SeqMap` is built on.
//!
//! The map only relies on the `Sequence` contract below; `SlotSequence` is
//! the stock implementation. Positions are 0-based and shift when earlier
//! elements are removed. Handles are generational and stay valid until their
//! own element is removed.

use slotmap::{DefaultKey, SlotMap};

/// Stable reference to one element of a sequence.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Handle(k)
    }
    pub(crate) fn raw_handle(&self) -> DefaultKey {
        self.0
    }
}

/// Append was refused; the element is handed back.
#[derive(Debug)]
pub struct Exhausted<T>(pub T);

pub trait Sequence<T> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append at the tail. Fails without side effects when the element
    /// cannot be stored.
    fn try_append(&mut self, item: T) -> Result<Handle, Exhausted<T>>;

    fn get(&self, position: usize) -> Option<&T>;

    fn get_handle(&self, handle: Handle) -> Option<&T>;

    fn handle_at(&self, position: usize) -> Option<Handle>;

    /// Position of the first element satisfying `pred`.
    fn position<F>(&self, pred: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool;

    /// Unlink the element at `position`, preserving the order of the rest.
    fn remove_at(&mut self, position: usize) -> Option<T>;

    /// Unlink every element, returned in sequence order.
    fn drain(&mut self) -> Vec<T>;
}

/// Slot-backed sequence: elements live in a generational `SlotMap`, their
/// order in a separate index vector.
#[derive(Debug)]
pub struct SlotSequence<T> {
    slots: SlotMap<DefaultKey, T>,
    order: Vec<DefaultKey>,
    limit: Option<usize>,
}

impl<T> SlotSequence<T> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// A sequence that refuses appends once it holds `limit` elements.
    /// Nothing is allocated up front; storage grows per append.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

impl<T> Default for SlotSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sequence<T> for SlotSequence<T> {
    fn len(&self) -> usize {
        self.order.len()
    }

    fn try_append(&mut self, item: T) -> Result<Handle, Exhausted<T>> {
        if self.limit.is_some_and(|l| self.order.len() >= l) {
            return Err(Exhausted(item));
        }
        if self.order.try_reserve(1).is_err() {
            return Err(Exhausted(item));
        }
        let k = self.slots.insert(item);
        self.order.push(k);
        Ok(Handle::new(k))
    }

    fn get(&self, position: usize) -> Option<&T> {
        let &k = self.order.get(position)?;
        self.slots.get(k)
    }

    fn get_handle(&self, handle: Handle) -> Option<&T> {
        self.slots.get(handle.raw_handle())
    }

    fn handle_at(&self, position: usize) -> Option<Handle> {
        self.order.get(position).map(|&k| Handle::new(k))
    }

    fn position<F>(&self, mut pred: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.order
            .iter()
            .position(|&k| self.slots.get(k).map(&mut pred).unwrap_or(false))
    }

    fn remove_at(&mut self, position: usize) -> Option<T> {
        if position >= self.order.len() {
            return None;
        }
        let k = self.order.remove(position);
        self.slots.remove(k)
    }

    fn drain(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.order.len());
        for k in self.order.drain(..) {
            if let Some(item) = self.slots.remove(k) {
                out.push(item);
            }
        }
        debug_assert!(self.slots.is_empty());
        out
    }
}
