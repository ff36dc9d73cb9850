//! Ember - Minimal HTTP/1.1 Server
//!
//! Core library for framing HTTP messages out of raw TCP byte streams
//! and dispatching them to an application handler.

pub mod config;
pub mod http;
pub mod server;
