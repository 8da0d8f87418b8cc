//! Pluggable per-instance behavior: how elements are compared and how they
//! are disposed of when they leave the map.
//!
//! Both are plain traits with blanket impls for closures, so a map can be
//! configured with a zero-sized strategy type or with any `Fn`/`FnMut`.

use core::cmp::Ordering;

/// Decides whether a stored element matches a query.
pub trait Equality<T: ?Sized> {
    fn equals(&self, stored: &T, query: &T) -> bool;
}

/// Equality via `PartialEq`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalEq;

impl<T: PartialEq + ?Sized> Equality<T> for NaturalEq {
    #[inline]
    fn equals(&self, stored: &T, query: &T) -> bool {
        stored == query
    }
}

/// Adapts a three-way comparator; two elements are equal iff it returns
/// `Ordering::Equal`.
#[derive(Debug, Clone, Copy)]
pub struct ByOrdering<F>(pub F);

impl<T: ?Sized, F> Equality<T> for ByOrdering<F>
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn equals(&self, stored: &T, query: &T) -> bool {
        (self.0)(stored, query) == Ordering::Equal
    }
}

impl<T: ?Sized, F> Equality<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    #[inline]
    fn equals(&self, stored: &T, query: &T) -> bool {
        self(stored, query)
    }
}

/// Placeholder for a strategy that was never supplied to the builder.
///
/// Never matches anything; the builder refuses to produce a map whose key
/// equality is `Unset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unset;

impl<T: ?Sized> Equality<T> for Unset {
    #[inline]
    fn equals(&self, _stored: &T, _query: &T) -> bool {
        false
    }
}

/// Consumes an element removed from the map.
pub trait Destroy<T> {
    fn destroy(&mut self, item: T);
}

/// No special cleanup: the element is dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Discard;

impl<T> Destroy<T> for Discard {
    #[inline]
    fn destroy(&mut self, item: T) {
        drop(item);
    }
}

impl<T, F> Destroy<T> for F
where
    F: FnMut(T),
{
    #[inline]
    fn destroy(&mut self, item: T) {
        self(item)
    }
}
