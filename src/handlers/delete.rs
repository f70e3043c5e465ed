//! Delete: remove an account after verifying its master password.

use tracing::info;

use super::{authenticate, Context};
use crate::errors::Result;
use crate::protocol::{Credentials, Response, StatusCode};
use crate::store::VaultStore;

/// Execute the Delete command.
pub fn execute<S: VaultStore>(ctx: &Context<S>, credentials: &Credentials) -> Result<Response> {
    ctx.locks.with_lock(&credentials.user, || {
        // Key material is only needed to prove the password; it is wiped
        // when this binding goes out of scope.
        let (_account, _material) = authenticate(&ctx.store, credentials)?;

        ctx.store.delete(&credentials.user)?;

        info!(user = %credentials.user, "account deleted");
        Ok(Response::status(StatusCode::Ok))
    })
}
