use crate::http::request::Request;
use bytes::Bytes;
use std::collections::HashMap;

/// Attempts to frame one complete HTTP message out of `buf`.
///
/// Returns the parsed message and the exact number of bytes it consumed,
/// or `None` when the buffer does not yet hold a full message and the
/// caller must wait for more bytes. Bytes beyond the consumed count (a pipelined
/// next message) are left untouched.
///
/// Malformed input degrades silently instead of erroring: a short request
/// line yields empty method/path strings, header lines without a `": "`
/// separator are dropped, and a non-numeric `Content-Length` counts as zero.
pub fn try_extract(buf: &[u8]) -> Option<(Request, usize)> {

    // Look for header/body separator
    let headers_end = find_headers_end(buf)?;
    let header_block = String::from_utf8_lossy(&buf[..headers_end]);

    let mut lines = header_block.split("\r\n");

    // Request line: method and path are the first two space-separated tokens.
    // The version token is not validated.
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split(' ');
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("").to_string();

    // Headers: keys lowercased, duplicate keys keep the last occurrence
    let mut headers = HashMap::new();
    for line in lines {
        if let Some((key, value)) = line.split_once(": ") {
            if key.is_empty() || value.is_empty() {
                continue;
            }
            headers.insert(key.to_ascii_lowercase(), value.to_string());
        }
    }

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = headers_end + 4;
    let total_needed = body_start + content_length;

    if buf.len() < total_needed {
        return None;
    }

    let body = if content_length > 0 {
        Some(Bytes::copy_from_slice(&buf[body_start..total_needed]))
    } else {
        None
    };

    Some((Request::new(method, path, headers, body), total_needed))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
}
