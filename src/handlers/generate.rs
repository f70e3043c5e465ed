//! Generate: produce a new password. No account, no store access.

use tracing::debug;
use zeroize::Zeroizing;

use super::Context;
use crate::errors::Result;
use crate::protocol::Response;
use crate::store::VaultStore;

/// Execute the Generate command.
pub fn execute<S: VaultStore>(ctx: &Context<S>, scheme: u32, size: u32) -> Result<Response> {
    let mut password = ctx.generator.generate(scheme, size)?;

    debug!(scheme, size, "password generated");
    Ok(Response::ok(Zeroizing::new(
        std::mem::take(&mut *password).into_bytes(),
    )))
}
