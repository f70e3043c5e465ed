//! `passvault serve`: run the vault server.

use std::path::Path;

use tracing::info;

use crate::cli::{load_settings, Cli};
use crate::errors::Result;
use crate::generator::{PasswordGenerator, Wordlist};
use crate::handlers::Context;
use crate::logging;
use crate::server::Server;
use crate::store::{MemoryStore, VaultStore};

/// Execute the `serve` command. Only returns on error.
pub fn execute(
    cli: &Cli,
    listen: Option<&str>,
    database: Option<&Path>,
    wordlist: Option<&Path>,
    in_memory: bool,
) -> Result<()> {
    // 1. Settings file first, then command-line overrides.
    let mut settings = load_settings(cli)?;
    if let Some(addr) = listen {
        settings.listen_addr = addr.to_string();
    }
    if let Some(path) = database {
        settings.database_path = path.to_path_buf();
    }
    if let Some(path) = wordlist {
        settings.wordlist_path = Some(path.to_path_buf());
    }

    logging::init(&settings.log_filter);

    // 2. Password generation collaborator.
    let wordlist = settings
        .wordlist_path
        .as_deref()
        .map(Wordlist::load)
        .transpose()?;
    if let Some(list) = &wordlist {
        info!(words = list.len(), dice = list.dice(), "diceware wordlist loaded");
    }
    let generator = PasswordGenerator::new(wordlist, settings.max_generate_size);

    // 3. Store backend, then the accept loop.
    if in_memory {
        info!("using in-memory store; accounts are lost on exit");
        return run(Context::new(MemoryStore::new(), generator), &settings);
    }

    open_database(&settings.database_path)
        .and_then(|store| run(Context::new(store, generator), &settings))
}

fn run<S: VaultStore + 'static>(ctx: Context<S>, settings: &crate::config::Settings) -> Result<()> {
    Server::bind(settings.listen_addr.as_str(), ctx, settings.max_message_bytes)?.run()
}

#[cfg(feature = "sqlite-store")]
fn open_database(path: &Path) -> Result<crate::store::SqliteStore> {
    let store = crate::store::SqliteStore::open(path)?;
    info!(path = %path.display(), "vault database ready");
    Ok(store)
}

#[cfg(not(feature = "sqlite-store"))]
fn open_database(_path: &Path) -> Result<MemoryStore> {
    Err(crate::errors::VaultError::Config(
        "built without the sqlite-store feature: use --in-memory".into(),
    ))
}
