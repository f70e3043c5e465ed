use thiserror::Error;

use crate::protocol::StatusCode;

/// All errors that can occur in PassVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Wire errors ---
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // --- Account errors ---
    #[error("Account '{0}' already exists")]
    Conflict(String),

    /// Also returned for a wrong master password so that callers cannot
    /// probe which accounts exist.
    #[error("Account not found")]
    NotFound,

    // --- Crypto errors ---
    #[error("Authentication failed, stored data could not be decrypted")]
    AuthenticationFailed,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    // --- Generation errors ---
    #[error("Password scheme {0} is not implemented")]
    NotImplemented(u32),

    #[error("Wordlist error: {0}")]
    Wordlist(String),

    // --- Storage errors ---
    #[error("Vault store error: {0}")]
    Store(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Server answered with status {0}")]
    UnexpectedStatus(StatusCode),
}

impl VaultError {
    /// The status code reported to the client for this error.
    ///
    /// Anything not explicitly enumerated collapses into `BadRequest`.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NotFound,
            Self::Conflict(_) => StatusCode::Conflict,
            Self::NotImplemented(_) => StatusCode::NotImplemented,
            _ => StatusCode::BadRequest,
        }
    }
}

#[cfg(feature = "sqlite-store")]
impl From<rusqlite::Error> for VaultError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Store(e.to_string())
    }
}

/// Convenience type alias for PassVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
