//! Blocking client for the wire protocol, used by the CLI subcommands.
//!
//! Each call opens a new connection, writes one message, half-closes the
//! socket to mark the end of the request and reads the response until the
//! server closes.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};

use zeroize::{Zeroize, Zeroizing};

use crate::errors::{Result, VaultError};
use crate::protocol::{Credentials, Message, Response, StatusCode};

pub struct Client {
    addr: String,
}

impl Client {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Send one message and return the raw response.
    pub fn send(&self, message: &Message) -> Result<Response> {
        let request = message.encode()?;

        let mut stream = TcpStream::connect(&self.addr)?;
        stream.write_all(&request)?;
        stream.shutdown(Shutdown::Write)?;

        let mut buf = Zeroizing::new(Vec::new());
        stream.read_to_end(&mut buf)?;
        Response::decode(&buf)
    }

    pub fn create(&self, user: &str, password: &str) -> Result<()> {
        let message = Message::Create(Credentials::new(user, password));
        expect_ok(self.send(&message)?, user).map(drop)
    }

    /// Fetch the decrypted password collection.
    pub fn retrieve(&self, user: &str, password: &str) -> Result<Zeroizing<Vec<u8>>> {
        let message = Message::Retrieve(Credentials::new(user, password));
        expect_ok(self.send(&message)?, user)
    }

    pub fn update(&self, user: &str, password: &str, json: &[u8]) -> Result<()> {
        let message = Message::Update {
            credentials: Credentials::new(user, password),
            json: Zeroizing::new(json.to_vec()),
        };
        expect_ok(self.send(&message)?, user).map(drop)
    }

    pub fn delete(&self, user: &str, password: &str) -> Result<()> {
        let message = Message::Delete(Credentials::new(user, password));
        expect_ok(self.send(&message)?, user).map(drop)
    }

    pub fn generate(&self, scheme: u32, size: u32) -> Result<Zeroizing<String>> {
        let response = self.send(&Message::Generate { scheme, size })?;
        if response.status == StatusCode::NotImplemented {
            return Err(VaultError::NotImplemented(scheme));
        }

        let mut payload = expect_ok(response, "")?;
        String::from_utf8(std::mem::take(&mut *payload))
            .map(Zeroizing::new)
            .map_err(|e| {
                let mut bad_bytes = e.into_bytes();
                bad_bytes.zeroize();
                VaultError::MalformedMessage("generated password is not valid UTF-8".into())
            })
    }
}

/// Turn a non-OK status into the matching error, else return the payload.
fn expect_ok(mut response: Response, user: &str) -> Result<Zeroizing<Vec<u8>>> {
    match response.status {
        StatusCode::Ok => Ok(Zeroizing::new(std::mem::take(&mut *response.payload))),
        StatusCode::NotFound => Err(VaultError::NotFound),
        StatusCode::Conflict => Err(VaultError::Conflict(user.to_string())),
        status => Err(VaultError::UnexpectedStatus(status)),
    }
}
