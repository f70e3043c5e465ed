//! `passvault create`: register a new account on the server.

use crate::cli::output;
use crate::cli::{prompt_new_password, server_addr, validate_user, Cli};
use crate::client::Client;
use crate::errors::Result;

/// Execute the `create` command.
pub fn execute(cli: &Cli, user: &str) -> Result<()> {
    validate_user(user)?;
    let client = Client::new(server_addr(cli)?);

    let password = prompt_new_password()?;
    client.create(user, &password)?;

    output::success(&format!("Account '{user}' created"));
    output::tip(&format!("Run `passvault update {user} <file.json>` to store passwords."));
    Ok(())
}
