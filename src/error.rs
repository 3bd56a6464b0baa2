//! Error types shared by the tree and the hash table.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors reported by this crate. Lookups of absent keys are not errors, they return `None`.
#[derive(Debug, Error)]
pub enum Error {
    /// A structural invariant (ordering, height, balance, count) does not hold.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Growing the bucket array failed. The table is left as it was before the attempt.
    #[error("failed to grow bucket array")]
    Allocation(#[from] TryReserveError),

    /// The grown bucket count doesn't fit in a `usize`. The table is left as it was before the
    /// attempt.
    #[error("bucket count overflow")]
    CapacityOverflow,

    /// A [`TableConfig`](crate::table::TableConfig) field is out of range.
    #[error("invalid table config: {0}")]
    InvalidConfig(&'static str),
}

/// Shorthand for results carrying an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
