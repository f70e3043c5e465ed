//! Binary response format.
//!
//! ```text
//! [status: i32 LE][payload: rest of stream]
//! ```
//!
//! The payload is the decrypted password collection for Retrieve, the
//! generated text for Generate, and empty otherwise.

use std::fmt;

use zeroize::Zeroizing;

use super::codes::StatusCode;
use crate::errors::{Result, VaultError};

/// Size of the status code prefix.
const STATUS_LEN: usize = 4;

/// One response, sent once per connection.
pub struct Response {
    pub status: StatusCode,
    pub payload: Zeroizing<Vec<u8>>,
}

impl Response {
    /// A successful response carrying `payload`.
    pub fn ok(payload: impl Into<Zeroizing<Vec<u8>>>) -> Self {
        Self {
            status: StatusCode::Ok,
            payload: payload.into(),
        }
    }

    /// A bare status with no payload.
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            payload: Zeroizing::new(Vec::new()),
        }
    }

    /// Serialize into the wire form. Wiped on drop since the payload may
    /// hold plaintext passwords.
    pub fn encode(&self) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(Vec::with_capacity(STATUS_LEN + self.payload.len()));
        out.extend_from_slice(&self.status.code().to_le_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    /// Parse a complete response as read from the server.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < STATUS_LEN {
            return Err(VaultError::MalformedMessage(format!(
                "response is {} bytes, status needs {STATUS_LEN}",
                bytes.len()
            )));
        }

        let (head, payload) = bytes.split_at(STATUS_LEN);
        let mut code = [0u8; STATUS_LEN];
        code.copy_from_slice(head);
        let status = StatusCode::try_from(i32::from_le_bytes(code))
            .map_err(|c| VaultError::MalformedMessage(format!("unknown status code {c}")))?;

        Ok(Self {
            status,
            payload: Zeroizing::new(payload.to_vec()),
        })
    }

    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::Ok
    }
}

impl From<VaultError> for Response {
    fn from(e: VaultError) -> Self {
        Self::status(e.status())
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_response_is_four_bytes() {
        let encoded = Response::status(StatusCode::Conflict).encode();
        assert_eq!(encoded.as_slice(), &409i32.to_le_bytes());
    }

    #[test]
    fn payload_follows_status_without_framing() {
        let encoded = Response::ok(b"secret text".to_vec()).encode();
        assert_eq!(&encoded[..4], &200i32.to_le_bytes());
        assert_eq!(&encoded[4..], b"secret text");

        let decoded = Response::decode(&encoded).unwrap();
        assert!(decoded.is_ok());
        assert_eq!(decoded.payload.as_slice(), b"secret text");
    }

    #[test]
    fn decode_rejects_short_or_unknown() {
        assert!(Response::decode(&[0, 1]).is_err());
        assert!(Response::decode(&123i32.to_le_bytes()).is_err());
    }

    #[test]
    fn errors_convert_to_their_status() {
        let response = Response::from(VaultError::NotFound);
        assert_eq!(response.status, StatusCode::NotFound);
        assert!(response.payload.is_empty());
    }
}
