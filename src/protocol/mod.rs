//! Wire protocol: one request and one response per connection.
//!
//! This module provides:
//! - Command tags and status codes (`codes`)
//! - Request encoding and decoding (`message`)
//! - Response encoding and decoding (`response`)

pub mod codes;
pub mod message;
pub mod response;

pub use codes::{Command, StatusCode};
pub use message::{Credentials, Message, HEADER_LEN};
pub use response::Response;
