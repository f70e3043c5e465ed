//! Retrieve: return the decrypted password collection.

use tracing::{error, info};

use super::{authenticate, Context};
use crate::crypto::envelope;
use crate::errors::{Result, VaultError};
use crate::protocol::{Credentials, Response};
use crate::store::VaultStore;

/// Execute the Retrieve command.
pub fn execute<S: VaultStore>(ctx: &Context<S>, credentials: &Credentials) -> Result<Response> {
    ctx.locks.with_lock(&credentials.user, || {
        let (account, material) = authenticate(&ctx.store, credentials)?;

        // The password verified, so a failure here means the stored blob
        // is damaged. Never hand back partially decrypted bytes.
        let plaintext = envelope::open(material.encryption_key(), &account.encrypted_blob)
            .inspect_err(|e| {
                if matches!(e, VaultError::AuthenticationFailed) {
                    error!(
                        user = %credentials.user,
                        "stored blob failed authentication after key verification"
                    );
                }
            })?;

        info!(user = %credentials.user, "passwords retrieved");
        Ok(Response::ok(plaintext))
    })
}
