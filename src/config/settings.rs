use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

/// Server configuration, loaded from `passvault.toml`.
///
/// Every field has a sensible default so the server runs out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Address the server listens on, and the client connects to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// SQLite database holding the accounts.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Diceware wordlist; without one the Diceware scheme is unavailable.
    #[serde(default)]
    pub wordlist_path: Option<PathBuf>,

    /// Largest request accepted on a connection (default: 1 MiB).
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,

    /// Largest `size` accepted by the Generate command.
    #[serde(default = "default_max_generate_size")]
    pub max_generate_size: u32,

    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_listen_addr() -> String {
    "127.0.0.1:4444".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("passvault.db")
}

fn default_max_message_bytes() -> usize {
    1024 * 1024
}

fn default_max_generate_size() -> u32 {
    1024
}

fn default_log_filter() -> String {
    "info".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            database_path: default_database_path(),
            wordlist_path: None,
            max_message_bytes: default_max_message_bytes(),
            max_generate_size: default_max_generate_size(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    pub const FILE_NAME: &'static str = "passvault.toml";

    /// Load settings from `<dir>/passvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_file(&config_path)
    }

    /// Load settings from an explicit file, which must exist.
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            VaultError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;

        toml::from_str(&contents)
            .map_err(|e| VaultError::Config(format!("Failed to parse {}: {e}", path.display())))
    }
}

// ── Tests ────────────────────────────────────────────────────────────
