//! HTTP protocol implementation.
//!
//! This module implements a minimal HTTP/1.1 server on raw byte streams,
//! with support for keep-alive connections and pipelined requests.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The main connection handler implementing the request-response state machine
//! - **`parser`**: Frames complete HTTP requests out of accumulated byte buffers
//! - **`request`**: Parsed HTTP request representation with header and JSON body access
//! - **`response`**: Write-once HTTP response with fluent status/header mutation
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`handler`**: The application handler contract
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Accumulate bytes until a full message is framed
//!        └──────┬──────┘
//!               │ Message framed
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Dispatch to the handler, await its response
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection, buffered
//!               │                pipelined requests are framed next)
//!               └─ Close → Closed
//! ```
//!
//! Framing may run ahead of dispatch: a single inbound chunk can contain
//! several complete messages. Dispatch never runs ahead of itself: the
//! handler for message N must produce its response before message N+1
//! leaves the buffer.
//!
//! # Example
//!
//! ```ignore
//! use ember::http::connection::Connection;
//! use ember::http::handler::default_handler;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:3000").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let handler = default_handler();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, handler);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
pub mod handler;
