//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::generator::PasswordScheme;

/// Minimum master password length accepted when creating an account.
const MIN_PASSWORD_LEN: usize = 8;

/// Longest user name the CLI will send.
const MAX_USER_LEN: usize = 255;

/// PassVault: networked master-password vault.
#[derive(Parser)]
#[command(
    name = "passvault",
    about = "Networked master-password vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ./passvault.toml when present)
    #[arg(short, long, global = true, env = "PASSVAULT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server address for client commands (default: listen_addr from config)
    #[arg(short, long, global = true, env = "PASSVAULT_ADDR")]
    pub addr: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the vault server
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        listen: Option<String>,

        /// SQLite database path
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Diceware wordlist (EFF format)
        #[arg(short, long)]
        wordlist: Option<PathBuf>,

        /// Keep accounts in memory only
        #[arg(long)]
        in_memory: bool,
    },

    /// Create a new account
    Create {
        /// Account name
        user: String,
    },

    /// Print an account's stored passwords
    Retrieve {
        /// Account name
        user: String,
    },

    /// Replace an account's stored passwords with a JSON file
    Update {
        /// Account name
        user: String,
        /// JSON file with the new password collection
        file: PathBuf,
    },

    /// Delete an account and everything stored for it
    Delete {
        /// Account name
        user: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Ask the server for a freshly generated password
    Generate {
        /// Generation scheme
        #[arg(value_enum)]
        scheme: SchemeArg,
        /// Characters (or words, for diceware) to generate
        #[arg(default_value = "16")]
        size: u32,
    },
}

/// Scheme names accepted on the command line.
#[derive(Clone, Copy, clap::ValueEnum)]
pub enum SchemeArg {
    LowerAlpha,
    Diceware,
    Alpha,
    Alphanumeric,
    Digits,
}

impl From<SchemeArg> for PasswordScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::LowerAlpha => Self::LowerAlpha,
            SchemeArg::Diceware => Self::Diceware,
            SchemeArg::Alpha => Self::Alpha,
            SchemeArg::Alphanumeric => Self::AlphaNumeric,
            SchemeArg::Digits => Self::Digits,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from `--config`, or from `./passvault.toml` if present.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.config {
        Some(path) => Settings::load_file(path),
        None => Settings::load(&std::env::current_dir()?),
    }
}

/// Address client commands connect to.
pub fn server_addr(cli: &Cli) -> Result<String> {
    match &cli.addr {
        Some(addr) => Ok(addr.clone()),
        None => Ok(load_settings(cli)?.listen_addr),
    }
}

/// Get the master password, trying in order:
/// 1. `PASSVAULT_PASSWORD` env var (scripts)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("PASSVAULT_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used by `create`).
///
/// Also respects `PASSVAULT_PASSWORD` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("PASSVAULT_PASSWORD") {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(VaultError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Validate an account name before sending it.
///
/// Must be non-empty, at most 255 bytes, and free of whitespace and
/// control characters.
pub fn validate_user(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(VaultError::CommandFailed("user name cannot be empty".into()));
    }

    if name.len() > MAX_USER_LEN {
        return Err(VaultError::CommandFailed(format!(
            "user name cannot exceed {MAX_USER_LEN} bytes"
        )));
    }

    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(VaultError::CommandFailed(format!(
            "user name '{}' cannot contain whitespace or control characters",
            name.escape_debug()
        )));
    }

    Ok(())
}
