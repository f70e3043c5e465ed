//! `passvault delete`: remove an account from the server.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{prompt_password, server_addr, validate_user, Cli};
use crate::client::Client;
use crate::errors::{Result, VaultError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, user: &str, force: bool) -> Result<()> {
    validate_user(user)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete account '{user}' and all its passwords?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let client = Client::new(server_addr(cli)?);
    let password = prompt_password()?;
    client.delete(user, &password)?;

    output::success(&format!("Deleted account '{user}'"));
    Ok(())
}
