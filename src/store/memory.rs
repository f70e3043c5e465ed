//! In-memory `VaultStore`, used by tests and `serve --in-memory`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{VaultAccount, VaultStore};
use crate::errors::{Result, VaultError};

/// Accounts kept in a `HashMap` behind a mutex. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<String, VaultAccount>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub fn len(&self) -> usize {
        self.accounts().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn accounts(&self) -> MutexGuard<'_, HashMap<String, VaultAccount>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl VaultStore for MemoryStore {
    fn get(&self, user: &str) -> Result<VaultAccount> {
        self.accounts().get(user).cloned().ok_or(VaultError::NotFound)
    }

    fn insert(&self, account: &VaultAccount) -> Result<()> {
        let mut accounts = self.accounts();
        if accounts.contains_key(&account.user) {
            return Err(VaultError::Conflict(account.user.clone()));
        }
        accounts.insert(account.user.clone(), account.clone());
        Ok(())
    }

    fn delete(&self, user: &str) -> Result<()> {
        self.accounts()
            .remove(user)
            .map(|_| ())
            .ok_or(VaultError::NotFound)
    }

    fn update_blob(&self, user: &str, encrypted_blob: &[u8]) -> Result<()> {
        let mut accounts = self.accounts();
        let account = accounts.get_mut(user).ok_or(VaultError::NotFound)?;
        account.encrypted_blob = encrypted_blob.to_vec();
        Ok(())
    }
}
