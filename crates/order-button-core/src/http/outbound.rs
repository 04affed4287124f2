use alloc::string::String;
use core::fmt::Write as _;

use super::ProtocolError;

/// A body-less request sent by the device, e.g. the signed order `PUT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub port: u16,
    pub path: &'a str,
    pub authorization: Option<&'a str>,
}

impl<'a> OutboundRequest<'a> {
    pub fn put(host: &'a str, port: u16, path: &'a str) -> Self {
        Self {
            method: "PUT",
            host,
            port,
            path,
            authorization: None,
        }
    }

    pub fn with_authorization(mut self, value: &'a str) -> Self {
        self.authorization = Some(value);
        self
    }

    /// Serializes the request line and headers. The body is always empty.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(256 + self.authorization.map_or(0, str::len));
        let _ = write!(out, "{} {} HTTP/1.1\r\n", self.method, self.path);
        if self.port == 80 {
            let _ = write!(out, "Host: {}\r\n", self.host);
        } else {
            let _ = write!(out, "Host: {}:{}\r\n", self.host, self.port);
        }
        if let Some(authorization) = self.authorization {
            let _ = write!(out, "Authorization: {authorization}\r\n");
        }
        out.push_str("Content-Length: 0\r\nConnection: close\r\n\r\n");
        out
    }
}

/// Extracts the status code from the first line of a response.
pub fn parse_status_line(response: &[u8]) -> Result<u16, ProtocolError> {
    let line_end = super::request::find(response, b"\r\n").unwrap_or(response.len());
    let line =
        core::str::from_utf8(&response[..line_end]).map_err(|_| ProtocolError::BadStatusLine)?;

    let mut parts = line.splitn(3, ' ');
    match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") && code.len() == 3 => {
            code.parse().map_err(|_| ProtocolError::BadStatusLine)
        }
        _ => Err(ProtocolError::BadStatusLine),
    }
}

/// Token of an `Authorization: Bearer <token>` value.
///
/// The value must be exactly two space-separated parts.
pub fn bearer_token(value: &str) -> Option<&str> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_signed_put() {
        let request = OutboundRequest::put("duststorm.ocf.berkeley.edu", 80, "/order")
            .with_authorization("Bearer a.b.c");
        assert_eq!(
            request.encode(),
            "PUT /order HTTP/1.1\r\nHost: duststorm.ocf.berkeley.edu\r\nAuthorization: Bearer a.b.c\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn test_non_default_port_in_host() {
        let request = OutboundRequest::put("127.0.0.1", 8080, "/order");
        assert!(request.encode().contains("Host: 127.0.0.1:8080\r\n"));
        assert!(!request.encode().contains("Authorization"));
    }

    #[test]
    fn test_parse_status_line() {
        assert_eq!(parse_status_line(b"HTTP/1.1 204 No Content\r\n\r\n"), Ok(204));
        assert_eq!(parse_status_line(b"HTTP/1.0 401 Unauthorized"), Ok(401));
        assert_eq!(
            parse_status_line(b"SSH-2.0-OpenSSH\r\n"),
            Err(ProtocolError::BadStatusLine)
        );
        assert_eq!(parse_status_line(b""), Err(ProtocolError::BadStatusLine));
        assert_eq!(
            parse_status_line(b"HTTP/1.1 2x4 Odd\r\n"),
            Err(ProtocolError::BadStatusLine)
        );
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer a.b.c"), Some("a.b.c"));
        assert_eq!(bearer_token("Basic dXNlcg=="), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer a.b.c extra"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }
}
