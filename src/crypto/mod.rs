//! Cryptographic primitives for PassVault.
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA256 master-key derivation and verification (`kdf`)
//! - AES-256-GCM envelope encryption of the password blob (`envelope`)
//! - the random source behind salts and nonces (`entropy`)

pub mod entropy;
pub mod envelope;
pub mod kdf;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{derive, verify, seal, open, ...};
pub use entropy::{EntropySource, OsEntropy};
pub use envelope::{open, seal, seal_with};
pub use kdf::{
    derive, generate_salt, generate_salt_with, verify, DerivedKeyMaterial, KEY_LEN, SALT_LEN,
};
