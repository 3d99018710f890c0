//! Crate-level error type.
//!
//! Every variant is fatal: the process logs it and exits non-zero.

use crate::config::ConfigError;
use crate::crypto::EntropyError;
use crate::handler::PersistenceError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Entropy(#[from] EntropyError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("failed to spawn thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("worker {0} panicked")]
    WorkerPanicked(usize),

    #[error("{0} panicked")]
    HandlerPanicked(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
