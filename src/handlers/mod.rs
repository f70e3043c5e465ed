//! Command handlers, one module per command.
//!
//! Every handler receives the decoded message fields and the shared
//! `Context`. Handlers that touch an existing account re-derive and verify
//! the master key themselves; nothing is carried over between requests.

pub mod create;
pub mod delete;
pub mod generate;
pub mod retrieve;
pub mod update;

use tracing::debug;

use crate::crypto::entropy::{EntropySource, OsEntropy};
use crate::crypto::kdf::{self, DerivedKeyMaterial, SALT_LEN};
use crate::errors::{Result, VaultError};
use crate::generator::PasswordGenerator;
use crate::protocol::{Credentials, Message, Response};
use crate::store::{AccountLocks, VaultAccount, VaultStore};

/// Dependencies shared by every handler.
pub struct Context<S: VaultStore> {
    pub store: S,
    pub locks: AccountLocks,
    pub generator: PasswordGenerator,
    /// Salts for new accounts and nonces for every sealed blob.
    pub entropy: Box<dyn EntropySource>,
}

impl<S: VaultStore> Context<S> {
    /// A context drawing randomness from the operating system.
    pub fn new(store: S, generator: PasswordGenerator) -> Self {
        Self {
            store,
            locks: AccountLocks::new(),
            generator,
            entropy: Box::new(OsEntropy),
        }
    }

    /// Replace the random source used for salts and nonces.
    pub fn with_entropy(mut self, entropy: impl EntropySource + 'static) -> Self {
        self.entropy = Box::new(entropy);
        self
    }
}

/// Route a decoded message to its handler.
pub fn dispatch<S: VaultStore>(ctx: &Context<S>, message: &Message) -> Result<Response> {
    match message {
        Message::Create(credentials) => create::execute(ctx, credentials),
        Message::Retrieve(credentials) => retrieve::execute(ctx, credentials),
        Message::Update { credentials, json } => update::execute(ctx, credentials, json),
        Message::Delete(credentials) => delete::execute(ctx, credentials),
        Message::Generate { scheme, size } => generate::execute(ctx, *scheme, *size),
    }
}

/// Load the account and check the supplied master password against it.
///
/// A missing account and a wrong password both yield `NotFound`. A missing
/// account still pays for one derivation so the two cases take the same
/// time.
fn authenticate<S: VaultStore>(
    store: &S,
    credentials: &Credentials,
) -> Result<(VaultAccount, DerivedKeyMaterial)> {
    let password = credentials.password.as_bytes();

    let account = match store.get(&credentials.user) {
        Ok(account) => account,
        Err(VaultError::NotFound) => {
            drop(kdf::derive(password, &[0u8; SALT_LEN]));
            return Err(VaultError::NotFound);
        }
        Err(e) => return Err(e),
    };

    match kdf::verify(password, &account.salt, &account.verification_hash) {
        Some(material) => Ok((account, material)),
        None => {
            debug!(user = %credentials.user, "master password rejected");
            Err(VaultError::NotFound)
        }
    }
}
