//! Web3 Secret Storage (version 3) keystore encoding.
//!
//! The private key is encrypted with AES-128-CTR under the first half of a
//! scrypt-derived key. The second half of the derived key authenticates the
//! ciphertext through a Keccak-256 MAC.

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::address::keccak256;
use super::Keypair;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

const CIPHER: &str = "aes-128-ctr";
const KDF: &str = "scrypt";
const VERSION: u32 = 3;
const DKLEN: usize = 32;

/// Errors raised while encrypting or decrypting a keystore.
#[derive(Debug, thiserror::Error)]
pub enum KeystoreError {
    #[error("invalid scrypt parameters: {0}")]
    KdfParams(String),

    #[error("key derivation failed: {0}")]
    Kdf(String),

    #[error("cipher initialisation failed: {0}")]
    Cipher(String),

    #[error("unsupported {field}: {value}")]
    Unsupported { field: &'static str, value: String },

    #[error("malformed hex field: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("ciphertext must be 32 bytes, got {0}")]
    CiphertextLength(usize),

    #[error("MAC mismatch (wrong password?)")]
    MacMismatch,

    #[error("entropy source failure: {0}")]
    Entropy(#[from] rand::Error),
}

/// scrypt cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptParams {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

impl ScryptParams {
    /// n = 4096, p = 6. Cheap enough to export many matches quickly.
    pub const LIGHT: Self = Self {
        log_n: 12,
        r: 8,
        p: 6,
    };

    fn derive(&self, password: &str, salt: &[u8]) -> Result<[u8; DKLEN], KeystoreError> {
        let params = scrypt::Params::new(self.log_n, self.r, self.p, DKLEN)
            .map_err(|e| KeystoreError::KdfParams(e.to_string()))?;

        let mut derived = [0u8; DKLEN];
        scrypt::scrypt(password.as_bytes(), salt, &params, &mut derived)
            .map_err(|e| KeystoreError::Kdf(e.to_string()))?;
        Ok(derived)
    }
}

/// Encrypted keystore document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keystore {
    /// Lowercase hex address without the `0x` marker
    pub address: String,
    pub crypto: CryptoJson,
    pub id: Uuid,
    pub version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoJson {
    pub cipher: String,
    pub ciphertext: String,
    pub cipherparams: CipherParams,
    pub kdf: String,
    pub kdfparams: KdfParams,
    pub mac: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherParams {
    pub iv: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfParams {
    pub dklen: usize,
    pub n: u32,
    pub p: u32,
    pub r: u32,
    pub salt: String,
}

fn apply_cipher(key: &[u8], iv: &[u8], data: &mut [u8]) -> Result<(), KeystoreError> {
    let mut cipher =
        Aes128Ctr::new_from_slices(key, iv).map_err(|e| KeystoreError::Cipher(e.to_string()))?;
    cipher.apply_keystream(data);
    Ok(())
}

impl Keystore {
    /// Encrypts `keypair` under `password`, with a fresh salt, IV and id.
    pub fn encrypt(
        keypair: &Keypair,
        password: &str,
        params: ScryptParams,
    ) -> Result<Self, KeystoreError> {
        let mut salt = [0u8; 32];
        let mut iv = [0u8; 16];
        let mut id = [0u8; 16];
        OsRng.try_fill_bytes(&mut salt)?;
        OsRng.try_fill_bytes(&mut iv)?;
        OsRng.try_fill_bytes(&mut id)?;

        let derived = params.derive(password, &salt)?;

        let mut ciphertext = *keypair.private_key_bytes();
        apply_cipher(&derived[..16], &iv, &mut ciphertext)?;
        let mac = keccak256(&[&derived[16..], &ciphertext]);

        Ok(Self {
            address: keypair.address().to_hex(),
            crypto: CryptoJson {
                cipher: CIPHER.into(),
                ciphertext: hex::encode(ciphertext),
                cipherparams: CipherParams {
                    iv: hex::encode(iv),
                },
                kdf: KDF.into(),
                kdfparams: KdfParams {
                    dklen: DKLEN,
                    n: 1u32 << params.log_n,
                    p: params.p,
                    r: params.r,
                    salt: hex::encode(salt),
                },
                mac: hex::encode(mac),
            },
            id: uuid::Builder::from_random_bytes(id).into_uuid(),
            version: VERSION,
        })
    }

    /// Recovers the private key, verifying the MAC first.
    pub fn decrypt(&self, password: &str) -> Result<[u8; 32], KeystoreError> {
        let crypto = &self.crypto;
        if crypto.cipher != CIPHER {
            return Err(KeystoreError::Unsupported {
                field: "cipher",
                value: crypto.cipher.clone(),
            });
        }
        if crypto.kdf != KDF {
            return Err(KeystoreError::Unsupported {
                field: "kdf",
                value: crypto.kdf.clone(),
            });
        }

        let kdf = &crypto.kdfparams;
        if !kdf.n.is_power_of_two() || kdf.dklen != DKLEN {
            return Err(KeystoreError::KdfParams(format!(
                "n={} dklen={}",
                kdf.n, kdf.dklen
            )));
        }
        let params = ScryptParams {
            log_n: kdf.n.trailing_zeros() as u8,
            r: kdf.r,
            p: kdf.p,
        };

        let salt = hex::decode(&kdf.salt)?;
        let iv = hex::decode(&crypto.cipherparams.iv)?;
        let ciphertext = hex::decode(&crypto.ciphertext)?;
        let mac = hex::decode(&crypto.mac)?;

        let derived = params.derive(password, &salt)?;
        if keccak256(&[&derived[16..], &ciphertext]).as_slice() != mac.as_slice() {
            return Err(KeystoreError::MacMismatch);
        }

        let mut secret: [u8; 32] = ciphertext
            .try_into()
            .map_err(|c: Vec<u8>| KeystoreError::CiphertextLength(c.len()))?;
        apply_cipher(&derived[..16], &iv, &mut secret)?;
        Ok(secret)
    }

    /// File name the keystore is exported under, e.g. `key_0xAbC….json`.
    pub fn file_name(keypair: &Keypair) -> String {
        format!("key_{}.json", keypair.address().to_checksum())
    }
}
