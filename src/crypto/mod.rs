//! Cryptographic operations for Ethereum key and address generation.
//!
//! This module provides:
//! - Per-worker CSPRNG key generation using secp256k1
//! - Ethereum address derivation using Keccak-256
//! - Encrypted keystore export

mod address;
mod keypair;
pub mod keystore;

pub use address::{Address, HEX_LEN, MARKER};
pub use keypair::{KeyGenerator, Keypair};
pub use keystore::{Keystore, KeystoreError, ScryptParams};

/// The secure random source failed.
///
/// Never retried: a worker without randomness cannot continue safely.
#[derive(Debug, thiserror::Error)]
#[error("secure random source unavailable: {0}")]
pub struct EntropyError(#[from] rand::Error);

/// Bytes that are not a valid secp256k1 secret scalar.
#[derive(Debug, thiserror::Error)]
#[error("invalid secret key")]
pub struct KeyError;
