//! Update: replace the password collection, keeping salt and hash.

use tracing::info;

use super::{authenticate, Context};
use crate::crypto::envelope;
use crate::errors::Result;
use crate::protocol::{Credentials, Response, StatusCode};
use crate::store::VaultStore;

/// Execute the Update command.
pub fn execute<S: VaultStore>(
    ctx: &Context<S>,
    credentials: &Credentials,
    json: &[u8],
) -> Result<Response> {
    ctx.locks.with_lock(&credentials.user, || {
        let (_account, material) = authenticate(&ctx.store, credentials)?;

        let encrypted_blob =
            envelope::seal_with(material.encryption_key(), json, ctx.entropy.as_ref())?;
        ctx.store.update_blob(&credentials.user, &encrypted_blob)?;

        info!(user = %credentials.user, bytes = json.len(), "passwords updated");
        Ok(Response::status(StatusCode::Ok))
    })
}
