//! AES-256-GCM envelope for the stored password blob.
//!
//! Each call to `seal` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext, so the stored blob is self-contained.
//!
//! Layout of a sealed blob:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use zeroize::Zeroizing;

use super::entropy::{EntropySource, OsEntropy};
use super::kdf::KEY_LEN;
use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt and authenticate `plaintext` under `key`.
///
/// Returns nonce || ciphertext || tag.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    seal_with(key, plaintext, &OsEntropy)
}

/// Like [`seal`], drawing the nonce from `entropy`.
pub fn seal_with(
    key: &[u8; KEY_LEN],
    plaintext: &[u8],
    entropy: &dyn EntropySource,
) -> Result<Vec<u8>> {
    let mut nonce = [0u8; NONCE_LEN];
    entropy.fill(&mut nonce)?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt a blob produced by `seal`.
///
/// Wrong key, tampering and truncation all fail with the same
/// `AuthenticationFailed`.
pub fn open(key: &[u8; KEY_LEN], sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(VaultError::AuthenticationFailed);
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| VaultError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plaintext_seals_to_nonce_and_tag() {
        let key = [0x42u8; KEY_LEN];
        let sealed = seal(&key, b"").unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + TAG_LEN);
        assert!(open(&key, &sealed).unwrap().is_empty());
    }

    struct DeadEntropy;

    impl EntropySource for DeadEntropy {
        fn fill(&self, _dst: &mut [u8]) -> Result<()> {
            Err(VaultError::EntropyUnavailable("no nonce for you".into()))
        }
    }

    #[test]
    fn dead_entropy_source_is_reported_not_panicked() {
        let key = [0x42u8; KEY_LEN];
        assert!(matches!(
            seal_with(&key, b"{}", &DeadEntropy),
            Err(VaultError::EntropyUnavailable(_))
        ));
    }

    #[test]
    fn flipping_the_nonce_fails() {
        let key = [0x42u8; KEY_LEN];
        let mut sealed = seal(&key, b"{\"mail\":\"pw\"}").unwrap();
        sealed[0] ^= 0x01;
        assert!(matches!(
            open(&key, &sealed),
            Err(VaultError::AuthenticationFailed)
        ));
    }
}
