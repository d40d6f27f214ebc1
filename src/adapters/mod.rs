//! Adapters layer: concrete implementations of ports.
//!
//! - `linear`: logistic-regression scorer loaded from an exported
//!   model file (demo/test stand-in for the production classifier)
//! - `memory`: in-process history store
//! - `sqlite`: persisted history store

pub mod linear;
pub mod memory;
pub mod sqlite;

use std::sync::PoisonError;

/// Error type for history storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("history lock poisoned")]
    LockPoisoned,
}

impl<T> From<PoisonError<T>> for StorageError {
    fn from(_: PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}
