//! Plain-data HTTP request/response types.
//!
//! # Design
//! The codec builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network; the session executes the round trip in
//! between. Keeping the wire shapes as plain data makes the codec fully
//! deterministic and testable without a device.
//!
//! Request paths are device-relative (`/local-api/...`); the session owns the
//! base address.

/// HTTP method for a request. The hub's API only uses these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An HTTP request described as plain data, built by the codec.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data, produced by the session and
/// consumed by the codec.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 2xx check used by the parse functions.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
