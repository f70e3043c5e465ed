//! SQLite-backed `VaultStore`.
//!
//! Accounts live in a single `users` table. The schema is created on open
//! if it does not exist yet.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::Duration;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::debug;

use super::{VaultAccount, VaultStore};
use crate::errors::{Result, VaultError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS users (
    user        TEXT PRIMARY KEY NOT NULL,
    salt        BLOB NOT NULL,
    master_key  BLOB NOT NULL,
    passwords   BLOB NOT NULL,
    blocked     INTEGER NOT NULL DEFAULT 0
);";

/// Connections opened for a file-backed store.
pub const POOL_SIZE: usize = 4;

/// How long a writer waits for another connection's write to finish.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite vault store.
///
/// File-backed stores keep a small pool of connections in WAL mode, so
/// requests for different accounts do not queue behind one another.
/// `rusqlite::Connection` is not `Sync`; each pooled connection sits
/// behind its own mutex.
pub struct SqliteStore {
    pool: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and bootstrap the schema.
    pub fn open(path: &Path) -> Result<Self> {
        let first = Connection::open(path)?;
        first.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        first.execute_batch(SCHEMA)?;

        let mut pool = vec![first];
        for _ in 1..POOL_SIZE {
            pool.push(Connection::open(path)?);
        }
        for conn in &pool {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
        }

        // Set restrictive permissions on the database (owner-only).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        debug!(path = %path.display(), connections = pool.len(), "opened vault database");
        Ok(Self::from_pool(pool))
    }

    /// A private, non-persistent database.
    ///
    /// Every in-memory connection is its own database, so this store has
    /// exactly one.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self::from_pool(vec![conn]))
    }

    /// Number of pooled connections.
    pub fn connections(&self) -> usize {
        self.pool.len()
    }

    fn from_pool(pool: Vec<Connection>) -> Self {
        Self {
            pool: pool.into_iter().map(Mutex::new).collect(),
            next: AtomicUsize::new(0),
        }
    }

    /// Take the first idle connection, or wait on one if all are busy.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        let start = self.next.fetch_add(1, Ordering::Relaxed);
        for i in 0..self.pool.len() {
            match self.pool[(start + i) % self.pool.len()].try_lock() {
                Ok(conn) => return conn,
                Err(TryLockError::Poisoned(e)) => return e.into_inner(),
                Err(TryLockError::WouldBlock) => {}
            }
        }
        self.pool[start % self.pool.len()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl VaultStore for SqliteStore {
    fn get(&self, user: &str) -> Result<VaultAccount> {
        self.conn()
            .query_row(
                "SELECT user, salt, master_key, passwords, blocked FROM users WHERE user = ?1",
                params![user],
                |row| {
                    Ok(VaultAccount {
                        user: row.get(0)?,
                        salt: row.get(1)?,
                        verification_hash: row.get(2)?,
                        encrypted_blob: row.get(3)?,
                        blocked: row.get(4)?,
                    })
                },
            )
            .optional()?
            .ok_or(VaultError::NotFound)
    }

    fn insert(&self, account: &VaultAccount) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO users (user, salt, master_key, passwords, blocked)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.user,
                account.salt,
                account.verification_hash,
                account.encrypted_blob,
                account.blocked
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(VaultError::Conflict(account.user.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, user: &str) -> Result<()> {
        let removed = self
            .conn()
            .execute("DELETE FROM users WHERE user = ?1", params![user])?;
        if removed == 0 {
            return Err(VaultError::NotFound);
        }
        Ok(())
    }

    fn update_blob(&self, user: &str, encrypted_blob: &[u8]) -> Result<()> {
        let updated = self.conn().execute(
            "UPDATE users SET passwords = ?1 WHERE user = ?2",
            params![encrypted_blob, user],
        )?;
        if updated == 0 {
            return Err(VaultError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn account(user: &str) -> VaultAccount {
        VaultAccount {
            user: user.to_string(),
            salt: vec![0x11; 16],
            verification_hash: vec![0x22; 32],
            encrypted_blob: vec![0x33; 28],
            blocked: false,
        }
    }

    #[test]
    fn open_creates_database_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.db");
        let _store = SqliteStore::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.db");

        SqliteStore::open(&path)
            .unwrap()
            .insert(&account("alice"))
            .unwrap();

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get("alice").unwrap(), account("alice"));
    }

    #[test]
    fn primary_key_violation_is_conflict() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert(&account("alice")).unwrap();
        assert!(matches!(
            store.insert(&account("alice")),
            Err(VaultError::Conflict(_))
        ));
    }

    #[test]
    fn missing_rows_are_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(store.get("ghost"), Err(VaultError::NotFound)));
        assert!(matches!(store.delete("ghost"), Err(VaultError::NotFound)));
        assert!(matches!(
            store.update_blob("ghost", &[1, 2, 3]),
            Err(VaultError::NotFound)
        ));
    }

    #[test]
    fn update_blob_then_delete() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert(&account("bob")).unwrap();
        store.update_blob("bob", &[0x44; 50]).unwrap();

        let stored = store.get("bob").unwrap();
        assert_eq!(stored.encrypted_blob, vec![0x44; 50]);
        assert_eq!(stored.salt, vec![0x11; 16]);
        assert!(!stored.blocked);

        store.delete("bob").unwrap();
        assert!(matches!(store.get("bob"), Err(VaultError::NotFound)));
    }

    #[test]
    fn file_store_is_pooled_and_in_memory_is_not() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&dir.path().join("vault.db")).unwrap();
        assert_eq!(store.connections(), POOL_SIZE);
        assert_eq!(SqliteStore::open_in_memory().unwrap().connections(), 1);
    }

    #[test]
    fn writes_on_one_connection_are_seen_by_all() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&dir.path().join("vault.db")).unwrap();
        store.insert(&account("alice")).unwrap();

        // Round-robin means consecutive reads land on different connections.
        for _ in 0..POOL_SIZE * 2 {
            assert_eq!(store.get("alice").unwrap(), account("alice"));
        }
    }

    #[test]
    fn parallel_writers_for_different_users() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteStore::open(&dir.path().join("vault.db")).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let user = format!("user{i}");
                    store.insert(&account(&user)).unwrap();
                    store.update_blob(&user, &[i as u8; 40]).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..8 {
            let stored = store.get(&format!("user{i}")).unwrap();
            assert_eq!(stored.encrypted_blob, vec![i as u8; 40]);
        }
    }

    #[cfg(unix)]
    #[test]
    fn database_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.db");
        let _store = SqliteStore::open(&path).unwrap();

        let perms = std::fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }
}
