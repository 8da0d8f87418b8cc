//! Error types returned by `SeqMap` and its builder.

use thiserror::Error;

/// The map was already inside another operation on the same instance.
///
/// Only produced with the `strict` feature; see `reentrancy`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("map is busy: nested entry during another operation")]
pub struct Busy;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateError {
    #[error("no key equality was supplied")]
    MissingKeyEquality,

    #[error("no value equality was supplied while `contains-value` is enabled")]
    MissingValueEquality,

    #[error("supplied storage already holds entries")]
    StorageNotEmpty,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    #[error("key already present")]
    DuplicateKey,

    #[error("storage cannot hold another entry")]
    StorageExhausted,

    #[error(transparent)]
    Busy(#[from] Busy),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveError {
    #[error("key not found")]
    NotFound,

    #[error("storage failed to remove the entry")]
    StorageFailed,

    #[error(transparent)]
    Busy(#[from] Busy),
}
