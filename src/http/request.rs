use bytes::Bytes;
use std::borrow::Cow;
use std::collections::HashMap;

/// Represents a parsed HTTP request from a client.
///
/// Produced once per successfully framed message and immutable afterwards.
/// Method and path are carried verbatim from the request line: a malformed
/// line yields empty strings rather than an error, and handlers see them
/// unchanged. Header keys are normalized to lowercase at construction.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.), as it appeared on the wire
    pub method: String,
    /// The request path/URL (e.g., "/index.html")
    pub path: String,
    /// Request headers, keys lowercased
    pub headers: HashMap<String, String>,
    /// Request body, present only when a non-zero `Content-Length` declared one
    pub body: Option<Bytes>,
}

impl Request {
    /// Creates a request, lowercasing any header keys that are not already.
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        headers: HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Self {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();

        Self {
            method: method.into(),
            path: path.into(),
            headers,
            body,
        }
    }

    /// Retrieves a header value by name, case-insensitively.
    ///
    /// # Example
    ///
    /// ```
    /// # use ember::http::request::Request;
    /// # use std::collections::HashMap;
    /// let mut headers = HashMap::new();
    /// headers.insert("Content-Type".to_string(), "application/json".to_string());
    /// let req = Request::new("GET", "/", headers, None);
    /// assert_eq!(req.header("content-TYPE"), Some("application/json"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The stored (lowercased) header names.
    pub fn header_names(&self) -> impl Iterator<Item = &str> {
        self.headers.keys().map(String::as_str)
    }

    /// Parses the body as JSON.
    ///
    /// Returns `None` for an absent body and for malformed JSON alike;
    /// callers must treat `None` as "no usable JSON body", not as a
    /// distinction between missing and invalid.
    pub fn json(&self) -> Option<serde_json::Value> {
        let body = self.body.as_ref()?;
        serde_json::from_slice(body).ok()
    }

    /// The body decoded as UTF-8 text, lossily.
    pub fn body_text(&self) -> Option<Cow<'_, str>> {
        self.body.as_deref().map(String::from_utf8_lossy)
    }

    /// Determines whether the connection should remain open after the response.
    ///
    /// True only when the client sent `Connection: keep-alive` (compared
    /// case-insensitively); an absent header or any other value closes the
    /// connection after this exchange.
    pub fn keep_alive(&self) -> bool {
        self.header("connection")
            .map(|v| v.eq_ignore_ascii_case("keep-alive"))
            .unwrap_or(false)
    }
}
