//! Diceware wordlists.
//!
//! Files use the EFF layout, one entry per line:
//!
//! ```text
//! 11111	abacus
//! 11112	abdomen
//! ```
//!
//! The id is the sequence of die faces (1–6) that selects the word. All ids
//! must have the same length `n` and the list must hold every one of the
//! `6^n` combinations.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rand::Rng;

use crate::errors::{Result, VaultError};

/// Longest supported roll; the EFF large list uses 5.
const MAX_DICE: usize = 6;

#[derive(Debug, Clone)]
pub struct Wordlist {
    dice: usize,
    words: HashMap<String, String>,
}

impl Wordlist {
    /// Load and validate a wordlist file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            VaultError::Wordlist(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&contents)
    }

    /// Parse wordlist text. Blank lines are skipped.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut dice = None;
        let mut words = HashMap::new();

        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut parts = line.split_whitespace();
            let (Some(id), Some(word), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(VaultError::Wordlist(format!(
                    "line {}: expected `<dice> <word>`",
                    lineno + 1
                )));
            };

            if !id.bytes().all(|b| (b'1'..=b'6').contains(&b)) {
                return Err(VaultError::Wordlist(format!(
                    "line {}: '{id}' is not a dice roll",
                    lineno + 1
                )));
            }

            match dice {
                None => dice = Some(id.len()),
                Some(n) if n != id.len() => {
                    return Err(VaultError::Wordlist(format!(
                        "line {}: roll '{id}' has {} dice, expected {n}",
                        lineno + 1,
                        id.len()
                    )));
                }
                Some(_) => {}
            }

            if words.insert(id.to_owned(), word.to_owned()).is_some() {
                return Err(VaultError::Wordlist(format!(
                    "line {}: duplicate roll '{id}'",
                    lineno + 1
                )));
            }
        }

        let dice = dice.ok_or_else(|| VaultError::Wordlist("wordlist is empty".into()))?;
        if dice > MAX_DICE {
            return Err(VaultError::Wordlist(format!(
                "rolls of {dice} dice are not supported (max {MAX_DICE})"
            )));
        }

        let expected = 6usize.pow(dice as u32);
        if words.len() != expected {
            return Err(VaultError::Wordlist(format!(
                "incomplete wordlist: {} entries, {dice} dice need {expected}",
                words.len()
            )));
        }

        Ok(Self { dice, words })
    }

    /// Dice rolled per word.
    pub fn dice(&self) -> usize {
        self.dice
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Pick one word by rolling the dice with `rng`.
    pub fn roll<R: Rng>(&self, rng: &mut R) -> &str {
        let id: String = (0..self.dice)
            .map(|_| char::from(b'0' + rng.random_range(1..=6u8)))
            .collect();
        // Completeness is checked in `parse`, so every roll has a word.
        self.words.get(&id).map_or("", String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_DIE: &str = "1\tuno\n2\tdos\n3\ttres\n4\tcuatro\n5\tcinco\n6\tseis\n";

    #[test]
    fn parses_a_complete_list() {
        let list = Wordlist::parse(ONE_DIE).unwrap();
        assert_eq!(list.dice(), 1);
        assert_eq!(list.len(), 6);
    }

    #[test]
    fn rolls_only_listed_words() {
        let list = Wordlist::parse(ONE_DIE).unwrap();
        let mut rng = rand::rng();
        for _ in 0..50 {
            let word = list.roll(&mut rng);
            assert!(["uno", "dos", "tres", "cuatro", "cinco", "seis"].contains(&word));
        }
    }

    #[test]
    fn rejects_incomplete_list() {
        let err = Wordlist::parse("1 uno\n2 dos\n").unwrap_err();
        assert!(err.to_string().contains("incomplete"));
    }

    #[test]
    fn rejects_mixed_roll_lengths() {
        let text = format!("{ONE_DIE}11 once\n");
        assert!(Wordlist::parse(&text).is_err());
    }

    #[test]
    fn rejects_bad_ids_and_duplicates() {
        assert!(Wordlist::parse("7 siete\n").is_err());
        assert!(Wordlist::parse("1 uno\n1 otra\n").is_err());
        assert!(Wordlist::parse("1 uno extra\n").is_err());
        assert!(Wordlist::parse("\n\n").is_err());
    }
}
