use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::error;

use crate::http::handler::SharedHandler;
use crate::http::parser::try_extract;
use crate::http::request::Request;
use crate::http::response::{self, Response};
use crate::http::writer::ResponseWriter;

/// One client connection: the stream, its receive buffer, and the framing
/// and dispatch state machine.
///
/// Generic over the stream type so tests can drive it with in-memory
/// duplex pipes instead of TCP sockets.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    handler: SharedHandler,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, handler: SharedHandler) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            handler,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    match self.read_message().await? {
                        Some(req) => {
                            self.state = ConnectionState::Processing(req);
                        }
                        None => {
                            self.state = ConnectionState::Closed;
                        }
                    }
                }

                ConnectionState::Processing(req) => {
                    // The persistence decision for this exchange is made from
                    // the request, before the handler runs.
                    let keep_alive = req.keep_alive();
                    let method = req.method.clone();
                    let path = req.path.clone();

                    let (res, rx) = Response::new(keep_alive);

                    // Await the handler to completion before framing the next
                    // buffered message: responses must leave in request order.
                    let payload = match self.handler.call(req, res).await {
                        Ok(()) => rx.await.ok(),
                        Err(e) => {
                            error!(method = %method, path = %path, error = %e, "Handler failed");
                            Some(match rx.await {
                                // The handler responded before failing; its
                                // response stands and the error is local.
                                Ok(sent) => sent,
                                Err(_) => response::internal_error_payload(keep_alive),
                            })
                        }
                    };

                    self.state = match payload {
                        Some(p) => ConnectionState::Writing(ResponseWriter::new(p), keep_alive),
                        // Handler finished without responding: nothing to
                        // write for this exchange.
                        None if keep_alive => ConnectionState::Reading,
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::Writing(mut writer, keep_alive) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if keep_alive {
                        self.state = ConnectionState::Reading; // go back for next request
                    } else {
                        self.stream.shutdown().await.ok();
                        self.state = ConnectionState::Closed;
                    }
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads until the buffer frames one complete message, then consumes
    /// exactly that message's bytes. Any pipelined trailing bytes stay in
    /// the buffer for the next pass. Returns `None` on peer EOF.
    pub async fn read_message(&mut self) -> anyhow::Result<Option<Request>> {
        loop {
            // Try framing whatever we already have
            if let Some((request, consumed)) = try_extract(&self.buffer) {
                self.buffer.advance(consumed);
                return Ok(Some(request));
            }

            // Need more data
            let n = self.stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                // Client closed connection; buffered partial bytes are discarded
                return Ok(None);
            }
        }
    }
}
