//! Binary request format.
//!
//! Every request starts with a little-endian `i32` command tag followed by
//! command-specific fields:
//!
//! ```text
//! Create / Retrieve / Delete:
//!   [tag: i32][user_len: u32][password_len: u32][user][password]
//! Update:
//!   [tag: i32][user_len: u32][password_len: u32][user][password][json: rest of message]
//! Generate:
//!   [tag: i32][scheme: u32][size: u32]
//! ```
//!
//! There is no outer framing: the peer closing its write side marks the
//! end of the message.

use std::fmt;

use zeroize::Zeroizing;

use super::codes::Command;
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Size of the command tag.
const TAG_LEN: usize = 4;

/// Fixed-size prefix shared by every command: tag + two 4-byte fields.
pub const HEADER_LEN: usize = 12;

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// User name and master password carried by every account command.
pub struct Credentials {
    pub user: String,
    pub password: Zeroizing<String>,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One decoded request.
pub enum Message {
    Create(Credentials),
    Retrieve(Credentials),
    Update {
        credentials: Credentials,
        /// New plaintext password collection, opaque to the server.
        json: Zeroizing<Vec<u8>>,
    },
    Delete(Credentials),
    Generate {
        /// Raw scheme value; unknown schemes are rejected by the generator,
        /// not the codec.
        scheme: u32,
        size: u32,
    },
}

impl Message {
    pub fn command(&self) -> Command {
        match self {
            Self::Create(_) => Command::Create,
            Self::Retrieve(_) => Command::Retrieve,
            Self::Update { .. } => Command::Update,
            Self::Delete(_) => Command::Delete,
            Self::Generate { .. } => Command::Generate,
        }
    }

    /// The account this message refers to, if any.
    pub fn user(&self) -> Option<&str> {
        self.credentials().map(|c| c.user.as_str())
    }

    fn credentials(&self) -> Option<&Credentials> {
        match self {
            Self::Create(c) | Self::Retrieve(c) | Self::Delete(c) => Some(c),
            Self::Update { credentials, .. } => Some(credentials),
            Self::Generate { .. } => None,
        }
    }

    /// Deserialize a complete request buffer.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);

        let tag = reader.i32("command tag")?;
        let command = Command::try_from(tag)
            .map_err(|t| VaultError::MalformedMessage(format!("unknown command tag {t}")))?;

        if bytes.len() < HEADER_LEN {
            return Err(VaultError::MalformedMessage(format!(
                "message is {} bytes, header needs {HEADER_LEN}",
                bytes.len()
            )));
        }

        if command == Command::Generate {
            let scheme = reader.u32("scheme")?;
            let size = reader.u32("size")?;
            reader.finish()?;
            return Ok(Self::Generate { scheme, size });
        }

        let user_len = reader.u32("user length")? as usize;
        let password_len = reader.u32("password length")? as usize;

        let user = reader.utf8(user_len, "user")?.to_owned();
        if user.is_empty() {
            return Err(VaultError::MalformedMessage("user is empty".into()));
        }
        let password = Zeroizing::new(reader.utf8(password_len, "password")?.to_owned());
        let credentials = Credentials { user, password };

        match command {
            Command::Create => {
                reader.finish()?;
                Ok(Self::Create(credentials))
            }
            Command::Retrieve => {
                reader.finish()?;
                Ok(Self::Retrieve(credentials))
            }
            Command::Delete => {
                reader.finish()?;
                Ok(Self::Delete(credentials))
            }
            Command::Update => Ok(Self::Update {
                credentials,
                json: Zeroizing::new(reader.rest().to_vec()),
            }),
            Command::Generate => unreachable!("handled above"),
        }
    }

    /// Serialize this message into its wire form.
    ///
    /// The returned buffer holds the master password and is wiped on drop.
    pub fn encode(&self) -> Result<Zeroizing<Vec<u8>>> {
        let mut out = Zeroizing::new(Vec::with_capacity(HEADER_LEN));
        out.extend_from_slice(&(self.command() as i32).to_le_bytes());

        match self {
            Self::Generate { scheme, size } => {
                out.extend_from_slice(&scheme.to_le_bytes());
                out.extend_from_slice(&size.to_le_bytes());
            }
            Self::Create(c) | Self::Retrieve(c) | Self::Delete(c) => {
                write_credentials(&mut out, c)?;
            }
            Self::Update { credentials, json } => {
                write_credentials(&mut out, credentials)?;
                out.extend_from_slice(json);
            }
        }

        Ok(out)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(c) => f.debug_tuple("Create").field(c).finish(),
            Self::Retrieve(c) => f.debug_tuple("Retrieve").field(c).finish(),
            Self::Delete(c) => f.debug_tuple("Delete").field(c).finish(),
            Self::Update { credentials, json } => f
                .debug_struct("Update")
                .field("credentials", credentials)
                .field("json_len", &json.len())
                .finish(),
            Self::Generate { scheme, size } => f
                .debug_struct("Generate")
                .field("scheme", scheme)
                .field("size", size)
                .finish(),
        }
    }
}

fn write_credentials(out: &mut Vec<u8>, credentials: &Credentials) -> Result<()> {
    let user = credentials.user.as_bytes();
    let password = credentials.password.as_bytes();

    out.extend_from_slice(&wire_len(user.len(), "user")?.to_le_bytes());
    out.extend_from_slice(&wire_len(password.len(), "password")?.to_le_bytes());
    out.extend_from_slice(user);
    out.extend_from_slice(password);
    Ok(())
}

fn wire_len(len: usize, field: &str) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| VaultError::InvalidRequest(format!("{field} is too long ({len} bytes)")))
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Bounds-checked cursor over a request buffer.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                VaultError::MalformedMessage(format!(
                    "{field} overruns the message ({len} bytes at offset {})",
                    self.pos
                ))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn field4(&mut self, field: &str) -> Result<[u8; TAG_LEN]> {
        let mut buf = [0u8; TAG_LEN];
        buf.copy_from_slice(self.take(TAG_LEN, field)?);
        Ok(buf)
    }

    fn i32(&mut self, field: &str) -> Result<i32> {
        self.field4(field).map(i32::from_le_bytes)
    }

    fn u32(&mut self, field: &str) -> Result<u32> {
        self.field4(field).map(u32::from_le_bytes)
    }

    fn utf8(&mut self, len: usize, field: &str) -> Result<&'a str> {
        let raw = self.take(len, field)?;
        std::str::from_utf8(raw)
            .map_err(|_| VaultError::MalformedMessage(format!("{field} is not valid UTF-8")))
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        rest
    }

    /// Fail if any bytes remain unread.
    fn finish(&self) -> Result<()> {
        let trailing = self.bytes.len() - self.pos;
        if trailing > 0 {
            return Err(VaultError::MalformedMessage(format!(
                "{trailing} unexpected trailing bytes"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(tag: i32, user: &[u8], password: &[u8], extra: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&tag.to_le_bytes());
        buf.extend_from_slice(&(user.len() as u32).to_le_bytes());
        buf.extend_from_slice(&(password.len() as u32).to_le_bytes());
        buf.extend_from_slice(user);
        buf.extend_from_slice(password);
        buf.extend_from_slice(extra);
        buf
    }

    #[test]
    fn decodes_delete() {
        let bytes = raw(4, b"usuario", b"hola", b"");
        match Message::decode(&bytes).unwrap() {
            Message::Delete(c) => {
                assert_eq!(c.user, "usuario");
                assert_eq!(c.password.as_str(), "hola");
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn update_takes_remainder_as_json() {
        let bytes = raw(3, b"alice", b"p1", br#"{"site":"pw"}"#);
        match Message::decode(&bytes).unwrap() {
            Message::Update { credentials, json } => {
                assert_eq!(credentials.user, "alice");
                assert_eq!(json.as_slice(), br#"{"site":"pw"}"#);
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn update_accepts_empty_json() {
        let bytes = raw(3, b"alice", b"p1", b"");
        assert!(matches!(
            Message::decode(&bytes).unwrap(),
            Message::Update { ref json, .. } if json.is_empty()
        ));
    }

    #[test]
    fn decodes_generate_with_unknown_scheme() {
        let mut bytes = 5i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&99u32.to_le_bytes());
        bytes.extend_from_slice(&12u32.to_le_bytes());
        assert!(matches!(
            Message::decode(&bytes).unwrap(),
            Message::Generate { scheme: 99, size: 12 }
        ));
    }

    #[test]
    fn rejects_unknown_tag() {
        let bytes = raw(7, b"alice", b"p1", b"");
        assert!(matches!(
            Message::decode(&bytes),
            Err(VaultError::MalformedMessage(_))
        ));
    }

    #[test]
    fn rejects_overrunning_lengths() {
        let mut bytes = raw(1, b"alice", b"p1", b"");
        // Claim a password longer than what follows.
        bytes[8..12].copy_from_slice(&50u32.to_le_bytes());
        assert!(matches!(
            Message::decode(&bytes),
            Err(VaultError::MalformedMessage(_))
        ));
    }

    #[test]
    fn rejects_length_overflow() {
        let mut bytes = raw(2, b"alice", b"p1", b"");
        bytes[4..8].copy_from_slice(&u32::MAX.to_le_bytes());
        bytes[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            Message::decode(&bytes),
            Err(VaultError::MalformedMessage(_))
        ));
    }

    #[test]
    fn rejects_trailing_bytes_on_fixed_commands() {
        let bytes = raw(1, b"alice", b"p1", b"junk");
        assert!(Message::decode(&bytes).is_err());

        let mut generate = 5i32.to_le_bytes().to_vec();
        generate.extend_from_slice(&[0u8; 9]);
        assert!(Message::decode(&generate).is_err());
    }

    #[test]
    fn rejects_invalid_utf8_and_empty_user() {
        let bytes = raw(1, &[0xff, 0xfe], b"p1", b"");
        assert!(Message::decode(&bytes).is_err());

        let bytes = raw(1, b"", b"p1", b"");
        assert!(Message::decode(&bytes).is_err());
    }

    #[test]
    fn debug_output_hides_password() {
        let message = Message::Create(Credentials::new("alice", "hunter2"));
        let shown = format!("{message:?}");
        assert!(shown.contains("alice"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn encode_matches_hand_built_layout() {
        let message = Message::Update {
            credentials: Credentials::new("alice", "p1"),
            json: Zeroizing::new(b"{}".to_vec()),
        };
        assert_eq!(
            message.encode().unwrap().as_slice(),
            raw(3, b"alice", b"p1", b"{}").as_slice()
        );
    }
}
