//! Password generation for the Generate command.
//!
//! Stateless: no account, no store access. Character schemes sample a
//! fixed alphabet; Diceware rolls dice against a configured wordlist.

pub mod wordlist;

pub use wordlist::Wordlist;

use rand::seq::IndexedRandom;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const DIGITS: &[u8] = b"0123456789";

/// Generation schemes and their wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordScheme {
    /// `size` lowercase ASCII letters.
    LowerAlpha = 1,
    /// `size` words from the configured diceware list.
    Diceware = 2,
    /// `size` ASCII letters of either case.
    Alpha = 3,
    /// `size` ASCII letters and digits.
    AlphaNumeric = 4,
    /// `size` decimal digits.
    Digits = 5,
}

impl TryFrom<u32> for PasswordScheme {
    type Error = VaultError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            1 => Ok(Self::LowerAlpha),
            2 => Ok(Self::Diceware),
            3 => Ok(Self::Alpha),
            4 => Ok(Self::AlphaNumeric),
            5 => Ok(Self::Digits),
            other => Err(VaultError::NotImplemented(other)),
        }
    }
}

impl PasswordScheme {
    fn alphabet(self) -> Option<&'static [u8]> {
        match self {
            Self::LowerAlpha => Some(LOWERCASE),
            Self::Alpha => Some(LETTERS),
            Self::AlphaNumeric => Some(ALPHANUMERIC),
            Self::Digits => Some(DIGITS),
            Self::Diceware => None,
        }
    }
}

/// Generates passwords for the Generate command.
pub struct PasswordGenerator {
    wordlist: Option<Wordlist>,
    max_size: u32,
}

impl PasswordGenerator {
    pub fn new(wordlist: Option<Wordlist>, max_size: u32) -> Self {
        Self { wordlist, max_size }
    }

    /// Produce a password for the raw wire `scheme` and `size`.
    ///
    /// Unknown schemes, and Diceware without a wordlist, fail with
    /// `NotImplemented`. Sizes above the configured maximum fail with
    /// `InvalidRequest`.
    pub fn generate(&self, scheme: u32, size: u32) -> Result<Zeroizing<String>> {
        let parsed = PasswordScheme::try_from(scheme)?;

        if size > self.max_size {
            return Err(VaultError::InvalidRequest(format!(
                "requested {size} items, limit is {}",
                self.max_size
            )));
        }

        let mut rng = rand::rng();

        if let Some(alphabet) = parsed.alphabet() {
            let password: String = (0..size)
                .filter_map(|_| alphabet.choose(&mut rng).map(|b| char::from(*b)))
                .collect();
            return Ok(Zeroizing::new(password));
        }

        let wordlist = self
            .wordlist
            .as_ref()
            .ok_or(VaultError::NotImplemented(scheme))?;

        let words: Vec<&str> = (0..size).map(|_| wordlist.roll(&mut rng)).collect();
        Ok(Zeroizing::new(words.join(" ")))
    }
}
