//! `passvault retrieve`: print an account's decrypted password collection.

use std::io::{self, Write};

use crate::cli::{prompt_password, server_addr, validate_user, Cli};
use crate::client::Client;
use crate::errors::Result;

/// Execute the `retrieve` command.
pub fn execute(cli: &Cli, user: &str) -> Result<()> {
    validate_user(user)?;
    let client = Client::new(server_addr(cli)?);

    let password = prompt_password()?;
    let blob = client.retrieve(user, &password)?;

    // Raw bytes to stdout so the output can be piped into a file or `jq`.
    let mut stdout = io::stdout().lock();
    stdout.write_all(&blob)?;
    if !blob.is_empty() && !blob.ends_with(b"\n") {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}
