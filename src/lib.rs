//! # eth_va
//!
//! Ethereum vanity address search.
//!
//! ## Architecture
//!
//! - `crypto`: Key generation, address derivation and keystore encryption
//! - `matcher`: Prefix/suffix pattern matching
//! - `worker`: Search workers, the worker pool and their messages
//! - `handler`: Match and progress consumers
//! - `search`: Channel wiring between workers and consumers
//! - `shutdown`: Signal-triggered process exit
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod error;
pub mod handler;
pub mod matcher;
pub mod search;
pub mod shutdown;
pub mod worker;

pub use config::{Config, ConfigError, MatchPolicy};
pub use crypto::{Address, KeyGenerator, Keypair, Keystore};
pub use error::{Error, Result};
pub use handler::{KeystoreExport, PersistenceError};
pub use matcher::{MatchResult, Pattern};
pub use search::{SearchSettings, Summary};
pub use worker::{Cancel, MatchEvent, PoolSettings, Progress, WorkerPool};
