//! Per-connection request/response cycle.
//!
//! A connection moves through
//! `AwaitingMessage -> Executing -> Responding -> Closed`.
//! Exactly one response is written for every connection, whatever
//! happens while reading, decoding or executing.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};
use crate::handlers::{self, Context};
use crate::protocol::{Message, Response, StatusCode};
use crate::store::VaultStore;

/// A byte stream the dispatcher can answer on and then close.
pub trait Transport: Read + Write {
    /// Close both directions once the response is written.
    fn close(&mut self) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

enum State {
    AwaitingMessage,
    Executing(Message),
    Responding(Response),
    Closed,
}

/// Serve a single request on `stream`.
///
/// Reads until the peer closes its write side, answers, then closes.
/// At most `max_message_bytes` are accepted; longer requests are answered
/// with `BadRequest`.
pub fn serve_connection<S: VaultStore, T: Transport>(
    ctx: &Context<S>,
    stream: &mut T,
    max_message_bytes: usize,
) -> Result<()> {
    let mut state = State::AwaitingMessage;

    loop {
        state = match state {
            State::AwaitingMessage => match read_message(stream, max_message_bytes) {
                Ok(bytes) => match Message::decode(&bytes) {
                    Ok(message) => State::Executing(message),
                    Err(e) => State::Responding(reject(e)),
                },
                Err(e) => State::Responding(reject(e)),
            },
            State::Executing(message) => State::Responding(execute(ctx, &message)),
            State::Responding(response) => {
                stream.write_all(&response.encode())?;
                stream.flush()?;
                debug!(status = %response.status, "response sent");
                State::Closed
            }
            State::Closed => {
                if let Err(e) = stream.close() {
                    // The peer may already have gone; nothing left to tell it.
                    debug!("closing connection: {e}");
                }
                return Ok(());
            }
        };
    }
}

/// Decode and execute one complete request buffer.
pub fn handle_request<S: VaultStore>(ctx: &Context<S>, bytes: &[u8]) -> Response {
    match Message::decode(bytes) {
        Ok(message) => execute(ctx, &message),
        Err(e) => reject(e),
    }
}

/// Run the handler for `message`, turning every failure into a response.
fn execute<S: VaultStore>(ctx: &Context<S>, message: &Message) -> Response {
    let command = message.command();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| handlers::dispatch(ctx, message)));

    match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            match e.status() {
                StatusCode::BadRequest => {
                    error!(?command, user = message.user(), "request failed: {e}");
                }
                status => {
                    info!(?command, user = message.user(), %status, "request refused");
                }
            }
            e.into()
        }
        Err(_) => {
            error!(?command, "handler panicked");
            Response::status(StatusCode::BadRequest)
        }
    }
}

fn reject(e: VaultError) -> Response {
    warn!("rejecting request: {e}");
    e.into()
}

fn read_message<T: Read>(stream: &mut T, limit: usize) -> Result<Zeroizing<Vec<u8>>> {
    let mut buf = Zeroizing::new(Vec::new());
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    stream.by_ref().take(cap).read_to_end(&mut buf)?;

    if buf.len() > limit {
        return Err(VaultError::InvalidRequest(format!(
            "message exceeds {limit} bytes"
        )));
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::PasswordGenerator;
    use crate::protocol::Credentials;
    use crate::store::MemoryStore;
    use std::io::Cursor;

    /// In-memory transport: reads from `input`, collects writes.
    struct Pipe {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
        closed: bool,
    }

    impl Pipe {
        fn new(input: Vec<u8>) -> Self {
            Self {
                input: Cursor::new(input),
                output: Vec::new(),
                closed: false,
            }
        }
    }

    impl Read for Pipe {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Pipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for Pipe {
        fn close(&mut self) -> io::Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    fn context() -> Context<MemoryStore> {
        Context::new(MemoryStore::new(), PasswordGenerator::new(None, 128))
    }

    #[test]
    fn garbage_gets_bad_request_and_close() {
        let ctx = context();
        let mut pipe = Pipe::new(vec![1, 2]);
        serve_connection(&ctx, &mut pipe, 1024).unwrap();

        assert_eq!(pipe.output, 400i32.to_le_bytes());
        assert!(pipe.closed);
    }

    #[test]
    fn oversized_message_is_rejected_before_decoding() {
        let ctx = context();
        let message = Message::Create(Credentials::new("alice", "p".repeat(100)));
        let mut pipe = Pipe::new(message.encode().unwrap().to_vec());
        serve_connection(&ctx, &mut pipe, 32).unwrap();

        assert_eq!(pipe.output, 400i32.to_le_bytes());
        assert!(ctx.store.is_empty());
    }

    #[test]
    fn generate_over_a_pipe() {
        let ctx = context();
        let message = Message::Generate { scheme: 5, size: 8 };
        let mut pipe = Pipe::new(message.encode().unwrap().to_vec());
        serve_connection(&ctx, &mut pipe, 1024).unwrap();

        let response = Response::decode(&pipe.output).unwrap();
        assert!(response.is_ok());
        assert_eq!(response.payload.len(), 8);
        assert!(response.payload.iter().all(u8::is_ascii_digit));
    }

    #[test]
    fn handle_request_maps_unknown_scheme() {
        let ctx = context();
        let bytes = Message::Generate { scheme: 77, size: 8 }.encode().unwrap();
        let response = handle_request(&ctx, &bytes);
        assert_eq!(response.status, StatusCode::NotImplemented);
        assert!(response.payload.is_empty());
    }
}
