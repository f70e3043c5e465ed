//! `passvault generate`: ask the server for a new password.

use crate::cli::{server_addr, Cli, SchemeArg};
use crate::client::Client;
use crate::errors::Result;
use crate::generator::PasswordScheme;

/// Execute the `generate` command.
pub fn execute(cli: &Cli, scheme: SchemeArg, size: u32) -> Result<()> {
    let client = Client::new(server_addr(cli)?);
    let password = client.generate(PasswordScheme::from(scheme) as u32, size)?;
    println!("{}", password.as_str());
    Ok(())
}
