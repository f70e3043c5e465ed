//! Numeric constants shared by client and server.

use std::fmt;

/// Commands recognised by the protocol, carried in the 4-byte tag that
/// opens every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Command {
    /// Create a new account.
    Create = 1,
    /// Return the decrypted password collection of an account.
    Retrieve = 2,
    /// Replace the password collection of an account.
    Update = 3,
    /// Remove an account and everything stored for it.
    Delete = 4,
    /// Generate a new password with a given scheme.
    Generate = 5,
}

impl TryFrom<i32> for Command {
    type Error = i32;

    fn try_from(tag: i32) -> std::result::Result<Self, Self::Error> {
        match tag {
            1 => Ok(Self::Create),
            2 => Ok(Self::Retrieve),
            3 => Ok(Self::Update),
            4 => Ok(Self::Delete),
            5 => Ok(Self::Generate),
            other => Err(other),
        }
    }
}

/// Status codes written as the first 4 bytes of every response.
///
/// Their exact meaning depends on the command that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum StatusCode {
    Ok = 200,
    BadRequest = 400,
    NotFound = 404,
    Conflict = 409,
    NotImplemented = 505,
}

impl StatusCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for StatusCode {
    type Error = i32;

    fn try_from(code: i32) -> std::result::Result<Self, Self::Error> {
        match code {
            200 => Ok(Self::Ok),
            400 => Ok(Self::BadRequest),
            404 => Ok(Self::NotFound),
            409 => Ok(Self::Conflict),
            505 => Ok(Self::NotImplemented),
            other => Err(other),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::Conflict => "Conflict",
            Self::NotImplemented => "Not Implemented",
        };
        write!(f, "{} {reason}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tags_match_wire_values() {
        for tag in 1..=5 {
            let command = Command::try_from(tag).unwrap();
            assert_eq!(command as i32, tag);
        }
        assert_eq!(Command::try_from(0), Err(0));
        assert_eq!(Command::try_from(6), Err(6));
        assert_eq!(Command::try_from(-1), Err(-1));
    }

    #[test]
    fn status_codes_roundtrip_through_i32() {
        for status in [
            StatusCode::Ok,
            StatusCode::BadRequest,
            StatusCode::NotFound,
            StatusCode::Conflict,
            StatusCode::NotImplemented,
        ] {
            assert_eq!(StatusCode::try_from(status.code()), Ok(status));
        }
        assert_eq!(StatusCode::try_from(500), Err(500));
    }

    #[test]
    fn status_display_includes_reason() {
        assert_eq!(StatusCode::NotFound.to_string(), "404 Not Found");
    }
}
