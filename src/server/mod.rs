//! TCP front end: one thread per accepted connection.

pub mod dispatcher;

pub use dispatcher::{handle_request, serve_connection, Transport};

use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::Arc;
use std::thread;

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::handlers::Context;
use crate::store::VaultStore;

/// A bound listener plus the handler context shared by its workers.
pub struct Server<S: VaultStore + 'static> {
    listener: TcpListener,
    ctx: Arc<Context<S>>,
    max_message_bytes: usize,
}

impl<S: VaultStore + 'static> Server<S> {
    /// Bind to `addr`. Use port 0 to let the OS pick one.
    pub fn bind(
        addr: impl ToSocketAddrs,
        ctx: Context<S>,
        max_message_bytes: usize,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self {
            listener,
            ctx: Arc::new(ctx),
            max_message_bytes,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, handing each to its own thread.
    ///
    /// Workers share nothing but the context; a failing worker only
    /// affects its own connection.
    pub fn run(self) -> Result<()> {
        info!(addr = %self.local_addr()?, "listening");

        for stream in self.listener.incoming() {
            let mut stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("accept failed: {e}");
                    continue;
                }
            };

            let peer = stream
                .peer_addr()
                .map_or_else(|_| "unknown".to_string(), |a| a.to_string());
            let ctx = Arc::clone(&self.ctx);
            let max_message_bytes = self.max_message_bytes;

            let spawned = thread::Builder::new()
                .name(format!("conn-{peer}"))
                .spawn(move || {
                    debug!(%peer, "connection accepted");
                    if let Err(e) = serve_connection(&ctx, &mut stream, max_message_bytes) {
                        warn!(%peer, "connection aborted: {e}");
                    }
                });

            if let Err(e) = spawned {
                warn!("cannot spawn worker thread: {e}");
            }
        }

        Ok(())
    }
}
