//! `passvault update`: replace an account's passwords with a JSON file.

use std::fs;
use std::path::Path;

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{prompt_password, server_addr, validate_user, Cli};
use crate::client::Client;
use crate::errors::{Result, VaultError};

/// Execute the `update` command.
pub fn execute(cli: &Cli, user: &str, file: &Path) -> Result<()> {
    validate_user(user)?;

    // The server stores the payload as opaque bytes; check it is JSON here
    // so a typo does not silently replace the collection with garbage.
    let json = Zeroizing::new(fs::read(file)?);
    serde_json::from_slice::<serde_json::Value>(&json).map_err(|e| {
        VaultError::CommandFailed(format!("{} is not valid JSON: {e}", file.display()))
    })?;

    let client = Client::new(server_addr(cli)?);
    let password = prompt_password()?;
    client.update(user, &password, &json)?;

    output::success(&format!(
        "Stored {} bytes of passwords for '{user}'",
        json.len()
    ));
    Ok(())
}
