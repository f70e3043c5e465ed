//! Create: register a new account with an empty password collection.

use tracing::info;

use super::Context;
use crate::crypto::{envelope, kdf};
use crate::errors::Result;
use crate::protocol::{Credentials, Response, StatusCode};
use crate::store::{VaultAccount, VaultStore};

/// Execute the Create command.
pub fn execute<S: VaultStore>(ctx: &Context<S>, credentials: &Credentials) -> Result<Response> {
    // 1. Fresh salt; a dead random source aborts the request.
    let salt = kdf::generate_salt_with(ctx.entropy.as_ref())?;

    // 2. Derive key material from the new master password.
    let material = kdf::derive(credentials.password.as_bytes(), &salt);

    // 3. Start the account with an empty sealed collection.
    let encrypted_blob =
        envelope::seal_with(material.encryption_key(), b"", ctx.entropy.as_ref())?;

    let account = VaultAccount {
        user: credentials.user.clone(),
        salt: salt.to_vec(),
        verification_hash: material.verification_hash().to_vec(),
        encrypted_blob,
        blocked: false,
    };

    // 4. The store enforces uniqueness; a taken name surfaces as Conflict.
    ctx.store.insert(&account)?;

    info!(user = %credentials.user, "account created");
    Ok(Response::status(StatusCode::Ok))
}
