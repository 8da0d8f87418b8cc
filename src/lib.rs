//! seq-map: a small key/value map for constrained, single-threaded targets.
//! Keys are unique under a per-instance equality strategy and lookup is a
//! linear scan over a position-addressable sequence.
//!
//! Internal Design:
//!
//! Layers
//! - `Sequence<T>`: ordered storage contract (append, positional get and
//!   remove, first-match scan, drain). `SlotSequence` implements it over a
//!   generational `SlotMap` plus an order vector, which gives every element a
//!   stable `Handle` while positions shift on removal.
//! - `SeqMap<K, V, ..>`: the associative layer. It stores one
//!   `Entry { key, value }` per position, so a key can never exist without
//!   its value and a failed append leaves nothing behind to roll back.
//! - `Builder`: validates the strategies and places the map by value, in a
//!   `Box`, or into caller-owned storage (`build_in`).
//!
//! Strategies
//! - `Equality<T>` decides key uniqueness/lookup and value membership.
//!   `NaturalEq` uses `PartialEq`; `ByOrdering` adapts a three-way
//!   comparator; plain `Fn(&T, &T) -> bool` closures work too.
//! - `Destroy<T>` receives elements that leave the map through `remove`,
//!   `clear` and `teardown`. `Discard` just drops them. `take` bypasses it
//!   and hands ownership back.
//!
//! Constraints
//! - Single-threaded: `Send` but `!Sync`. Callers needing shared access
//!   wrap the map in their own lock.
//! - No ordering, hashing or iteration beyond `len`.
//! - Entries are never updated in place.
//!
//! Reentrancy
//! - Guarded operations run user equality code while scanning. Entering the
//!   same map again from that code is refused (`strict` feature) or trips a
//!   debug assertion. Destroy callbacks run after the entry is unlinked.
//!
//! Features
//! - `strict` (default): re-entry yields `Busy`/`None`/`false`.
//! - `contains-value` (default): `SeqMap::contains_value`; construction
//!   requires a value equality.
//! - `version` (default): `library_version()`.

mod builder;
mod error;
mod reentrancy;
pub mod seq_map;
mod seq_map_proptest;
pub mod sequence;
pub mod strategy;

// Public surface
pub use builder::Builder;
pub use error::{Busy, CreateError, InsertError, RemoveError};
pub use seq_map::{Entry, SeqMap};
pub use sequence::{Exhausted, Handle, Sequence, SlotSequence};
pub use strategy::{ByOrdering, Destroy, Discard, Equality, NaturalEq, Unset};

/// Human-readable library identifier, fixed at build time.
#[cfg(feature = "version")]
pub const LIBRARY_VERSION: &str = concat!("seq-map v", env!("CARGO_PKG_VERSION"));

#[cfg(feature = "version")]
pub fn library_version() -> &'static str {
    LIBRARY_VERSION
}
