//! Vault store: durable account records keyed by user name.
//!
//! This module provides:
//! - The `VaultAccount` record and the `VaultStore` interface handlers use
//! - An in-memory backend (`memory`)
//! - A SQLite backend (`sqlite`, behind the `sqlite-store` feature)
//! - Per-account write serialization (`locks`)

pub mod locks;
pub mod memory;
#[cfg(feature = "sqlite-store")]
pub mod sqlite;

pub use locks::AccountLocks;
pub use memory::MemoryStore;
#[cfg(feature = "sqlite-store")]
pub use sqlite::SqliteStore;

use std::fmt;

use crate::errors::Result;

/// One account as persisted by a store.
#[derive(Clone, PartialEq, Eq)]
pub struct VaultAccount {
    pub user: String,

    /// Random salt fixed at creation.
    pub salt: Vec<u8>,

    /// `SHA-256` of the derived encryption key.
    pub verification_hash: Vec<u8>,

    /// Sealed password collection (nonce + ciphertext + tag).
    pub encrypted_blob: Vec<u8>,

    /// Reserved for an external access policy; no handler sets it.
    pub blocked: bool,
}

impl fmt::Debug for VaultAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultAccount")
            .field("user", &self.user)
            .field("salt_len", &self.salt.len())
            .field("encrypted_blob_len", &self.encrypted_blob.len())
            .field("blocked", &self.blocked)
            .finish()
    }
}

/// Narrow storage interface the command handlers are written against.
///
/// Implementations must be safe to share between connection threads.
pub trait VaultStore: Send + Sync {
    /// Load an account; `NotFound` if it does not exist.
    fn get(&self, user: &str) -> Result<VaultAccount>;

    /// Insert a new account; `Conflict` if the user name is taken.
    fn insert(&self, account: &VaultAccount) -> Result<()>;

    /// Remove an account; `NotFound` if it does not exist.
    fn delete(&self, user: &str) -> Result<()>;

    /// Replace the sealed blob only; `NotFound` if the account is gone.
    fn update_blob(&self, user: &str, encrypted_blob: &[u8]) -> Result<()>;
}

impl<S: VaultStore + ?Sized> VaultStore for std::sync::Arc<S> {
    fn get(&self, user: &str) -> Result<VaultAccount> {
        (**self).get(user)
    }

    fn insert(&self, account: &VaultAccount) -> Result<()> {
        (**self).insert(account)
    }

    fn delete(&self, user: &str) -> Result<()> {
        (**self).delete(user)
    }

    fn update_blob(&self, user: &str, encrypted_blob: &[u8]) -> Result<()> {
        (**self).update_blob(user, encrypted_blob)
    }
}
