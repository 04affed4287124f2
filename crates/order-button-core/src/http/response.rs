use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;

use crate::config::SERVER_NAME;

pub const TEXT_PLAIN: &str = "text/plain;charset=utf-8";
pub const TEXT_HTML: &str = "text/html;charset=utf-8";
pub const TEXT_CSS: &str = "text/css;charset=utf-8";

/// Response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body<'a> {
    /// Small body written straight after the head
    Bytes(&'a [u8]),
    /// Body of a known length forwarded chunk by chunk by the caller
    Stream { len: usize },
}

impl Body<'_> {
    pub fn len(&self) -> usize {
        match self {
            Body::Bytes(bytes) => bytes.len(),
            Body::Stream { len } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An outbound response. Every response closes its connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse<'a> {
    pub status: u16,
    pub reason: &'static str,
    /// Header fields in write order, without `Content-Length`
    pub headers: Vec<(&'a str, &'a str)>,
    pub body: Body<'a>,
}

impl<'a> HttpResponse<'a> {
    /// Response carrying the fixed portal headers.
    pub fn new(status: u16, reason: &'static str, content_type: &'a str, body: Body<'a>) -> Self {
        Self {
            status,
            reason,
            headers: alloc::vec![
                ("Server", SERVER_NAME),
                ("Content-Type", content_type),
                ("Connection", "close"),
            ],
            body,
        }
    }

    pub fn ok_text(body: &'a str) -> Self {
        Self::new(200, "OK", TEXT_PLAIN, Body::Bytes(body.as_bytes()))
    }

    /// A page served from `location`
    pub fn ok_html(location: &'a str, body: &'a str) -> Self {
        Self::new(200, "OK", TEXT_HTML, Body::Bytes(body.as_bytes()))
            .with_header("Location", location)
            .with_header("Allow", "GET")
            .with_header("Content-Language", "en-US")
    }

    /// Head of a response whose body of `len` bytes follows in chunks.
    pub fn ok_stream(location: &'a str, content_type: &'a str, len: usize) -> Self {
        Self::new(200, "OK", content_type, Body::Stream { len })
            .with_header("Location", location)
            .with_header("Allow", "GET")
    }

    pub fn bad_request() -> Self {
        Self::new(400, "Bad Request", TEXT_PLAIN, Body::Bytes(b"Bad Request"))
    }

    pub fn not_found() -> Self {
        Self::new(404, "Not Found", TEXT_PLAIN, Body::Bytes(b"Not Found"))
    }

    pub fn with_header(mut self, name: &'a str, value: &'a str) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Status line and headers, terminated by the blank line.
    ///
    /// `Content-Length` is always last and always equals the body length.
    pub fn head(&self) -> String {
        let mut head = String::with_capacity(160);
        // Writing into a String cannot fail
        let _ = write!(head, "HTTP/1.1 {} {}\r\n", self.status, self.reason);
        for (name, value) in &self.headers {
            let _ = write!(head, "{name}: {value}\r\n");
        }
        let _ = write!(head, "Content-Length: {}\r\n\r\n", self.body.len());
        head
    }

    /// Head followed by the body, or `None` for a streamed body.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        match self.body {
            Body::Bytes(bytes) => {
                let mut out = self.head().into_bytes();
                out.extend_from_slice(bytes);
                Some(out)
            }
            Body::Stream { .. } => None,
        }
    }
}
