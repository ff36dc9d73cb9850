use std::collections::HashMap;

use tokio::sync::oneshot;

use crate::http::writer;

/// Returns the reason phrase for the status codes this server emits.
///
/// Only the five common codes have literal text; every other numeric code
/// falls back to "OK". Callers must not rely on accurate phrases for
/// uncommon codes.
pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteState {
    Unsent,
    Sent,
    Ended,
}

/// A write-once HTTP response.
///
/// Starts out unsent with status 200 and a `text/plain` content type.
/// [`status`](Response::status) and [`set_header`](Response::set_header)
/// chain and are only meaningful before the response is written;
/// [`send`](Response::send), [`json`](Response::json) and
/// [`end`](Response::end) serialize the response exactly once; any call
/// after the first is a silent no-op.
///
/// The serialized bytes travel back to the owning connection through a
/// oneshot channel; the connection performs the socket write and closes
/// the socket afterwards when the exchange is not keep-alive.
#[derive(Debug)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    keep_alive: bool,
    state: WriteState,
    out: Option<oneshot::Sender<Vec<u8>>>,
}

impl Response {
    /// Creates a response whose serialized bytes arrive on the returned
    /// receiver. `keep_alive` decides the `Connection` header value.
    pub fn new(keep_alive: bool) -> (Self, oneshot::Receiver<Vec<u8>>) {
        let (tx, rx) = oneshot::channel();

        let mut headers = HashMap::new();
        headers.insert(
            "Content-Type".to_string(),
            "text/plain; charset=utf-8".to_string(),
        );

        let response = Self {
            status: 200,
            headers,
            keep_alive,
            state: WriteState::Unsent,
            out: Some(tx),
        };

        (response, rx)
    }

    /// Sets the status code. No-op once the response has been written.
    pub fn status(&mut self, code: u16) -> &mut Self {
        if self.state == WriteState::Unsent {
            self.status = code;
        }
        self
    }

    /// Adds or replaces a header. No-op once the response has been written.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        if self.state == WriteState::Unsent {
            self.headers.insert(key.into(), value.into());
        }
        self
    }

    /// Writes status line, headers and `body` as one logical write.
    ///
    /// `Content-Length` is set from the byte length of `body`, not its
    /// character count.
    pub fn send(&mut self, body: impl AsRef<[u8]>) {
        if self.state != WriteState::Unsent {
            return;
        }
        let body = body.as_ref();
        self.headers
            .insert("Content-Length".to_string(), body.len().to_string());
        self.write_payload(body);
        self.state = WriteState::Sent;
    }

    /// [`send`](Response::send) with `data` JSON-stringified and the
    /// content type overridden to `application/json`.
    pub fn json(&mut self, data: &serde_json::Value) {
        self.set_header("Content-Type", "application/json; charset=utf-8");
        self.send(data.to_string());
    }

    /// Writes the head only, with no body.
    pub fn end(&mut self) {
        if self.state != WriteState::Unsent {
            return;
        }
        self.write_payload(&[]);
        self.state = WriteState::Ended;
    }

    fn write_payload(&mut self, body: &[u8]) {
        self.headers.insert(
            "Connection".to_string(),
            if self.keep_alive { "keep-alive" } else { "close" }.to_string(),
        );

        let mut buf = writer::serialize_head(self.status, &self.headers);
        buf.extend_from_slice(body);

        if let Some(out) = self.out.take() {
            // A dropped receiver means the connection is already torn down;
            // the response has nowhere to go.
            let _ = out.send(buf);
        }
    }
}

/// Serialized `500 Internal Server Error` reply, used when a handler fails
/// before producing a response.
pub(crate) fn internal_error_payload(keep_alive: bool) -> Vec<u8> {
    let (mut res, mut rx) = Response::new(keep_alive);
    res.status(500)
        .json(&serde_json::json!({ "error": "Internal Server Error" }));
    rx.try_recv().unwrap_or_default()
}
