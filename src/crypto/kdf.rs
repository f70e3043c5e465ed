//! Master-key derivation using PBKDF2-HMAC-SHA256.
//!
//! From a master password and the account salt we derive:
//! - a 32-byte **encryption key** that seals the password blob, and
//! - a **verification hash**, `SHA-256(encryption key)`, which is the only
//!   derivative ever stored.
//!
//! Nothing is cached between requests: every authenticated operation
//! re-derives the material from the password it was given.

use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::entropy::{EntropySource, OsEntropy};
use crate::errors::Result;

/// Length of the per-account salt in bytes.
pub const SALT_LEN: usize = 16;

/// Length of the derived encryption key (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Fixed PBKDF2 iteration count. Changing it invalidates every stored
/// verification hash.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Key material for a single request. Wiped when dropped, on every path.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKeyMaterial {
    encryption_key: [u8; KEY_LEN],
    verification_hash: [u8; KEY_LEN],
}

impl DerivedKeyMaterial {
    /// Key handed to the envelope cipher.
    pub fn encryption_key(&self) -> &[u8; KEY_LEN] {
        &self.encryption_key
    }

    /// Hash stored alongside the account to validate later passwords.
    pub fn verification_hash(&self) -> &[u8; KEY_LEN] {
        &self.verification_hash
    }

    /// Constant-time comparison against a stored verification hash.
    pub fn matches(&self, stored_hash: &[u8]) -> bool {
        self.verification_hash[..].ct_eq(stored_hash).into()
    }
}

/// Derive key material from a password and salt.
///
/// Deterministic: the same inputs always give the same key and hash.
pub fn derive(password: &[u8], salt: &[u8]) -> DerivedKeyMaterial {
    let mut material = DerivedKeyMaterial {
        encryption_key: [0u8; KEY_LEN],
        verification_hash: [0u8; KEY_LEN],
    };

    pbkdf2_hmac::<Sha256>(
        password,
        salt,
        PBKDF2_ITERATIONS,
        &mut material.encryption_key,
    );
    material.verification_hash = Sha256::digest(&material.encryption_key).into();

    material
}

/// Re-derive key material and check it against `stored_hash`.
///
/// Returns `None` on mismatch, so a caller can only obtain the encryption
/// key after the password has been verified.
pub fn verify(password: &[u8], salt: &[u8], stored_hash: &[u8]) -> Option<DerivedKeyMaterial> {
    let material = derive(password, salt);
    material.matches(stored_hash).then_some(material)
}

/// Generate a fresh account salt from the operating system's CSPRNG.
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    generate_salt_with(&OsEntropy)
}

/// Generate a salt from an explicit random source.
///
/// A failing source aborts with its `EntropyUnavailable`; there is no
/// fallback.
pub fn generate_salt_with(entropy: &dyn EntropySource) -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    entropy.fill(&mut salt)?;
    Ok(salt)
}
