use alloc::vec::Vec;

use super::ProtocolError;

/// Method as sniffed from the first raw bytes of a request.
///
/// Routing only ever looks at this, not at the parsed method token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other,
}

impl Method {
    pub fn sniff(raw: &[u8]) -> Self {
        if raw.starts_with(b"GET") {
            Method::Get
        } else if raw.starts_with(b"POST") {
            Method::Post
        } else {
            Method::Other
        }
    }
}

/// An inbound request borrowed from the connection's read buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest<'a> {
    /// Method token as written by the client
    pub method: &'a str,
    pub path: &'a str,
    /// Header fields in arrival order, values trimmed
    pub headers: Vec<(&'a str, &'a str)>,
    pub body: &'a [u8],
    sniffed: Method,
}

const HEAD_END: &[u8] = b"\r\n\r\n";

impl<'a> HttpRequest<'a> {
    /// Parses one request read in a single shot.
    ///
    /// The method ends at the first space and the path at the next space
    /// (or at the end of the request line). Headers end at the first blank
    /// line; everything after it is body, verbatim.
    pub fn parse(raw: &'a [u8]) -> Result<Self, ProtocolError> {
        let (head, body) = match find(raw, HEAD_END) {
            Some(at) => (&raw[..at], &raw[at + HEAD_END.len()..]),
            None => (raw, &raw[raw.len()..]),
        };
        let head = core::str::from_utf8(head).map_err(|_| ProtocolError::NotUtf8)?;

        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default();
        let (method, rest) = request_line
            .split_once(' ')
            .ok_or(ProtocolError::NoLocation)?;
        let path = rest.split(' ').next().unwrap_or_default();

        let headers = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim(), value.trim()))
            .collect();

        Ok(Self {
            method,
            path,
            headers,
            body,
            sniffed: Method::sniff(raw),
        })
    }

    /// Method used for routing, taken from the raw request prefix.
    pub fn sniffed_method(&self) -> Method {
        self.sniffed
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }
}

pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
