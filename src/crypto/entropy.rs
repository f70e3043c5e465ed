//! Random byte sources for salts and nonces.

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::errors::{Result, VaultError};

/// Where salts and nonces come from.
///
/// A source that cannot deliver must fail with `EntropyUnavailable`; callers
/// never fall back to weaker randomness.
pub trait EntropySource: Send + Sync {
    fn fill(&self, dst: &mut [u8]) -> Result<()>;
}

/// The operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dst: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(dst)
            .map_err(|e| VaultError::EntropyUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_entropy_fills_the_buffer() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        OsEntropy.fill(&mut a).unwrap();
        OsEntropy.fill(&mut b).unwrap();
        assert_ne!(a, b);
    }
}
