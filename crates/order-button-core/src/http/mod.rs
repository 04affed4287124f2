//! Minimal HTTP/1.1 message codec.
//!
//! Just enough HTTP for the configuration portal and the outbound order
//! request: one request per connection, no persistent connections, no
//! chunked transfer-encoding, no TLS.

mod form;
mod outbound;
mod request;
mod response;

pub use form::{FormError, parse_credentials};
pub use outbound::{OutboundRequest, bearer_token, parse_status_line};
pub use request::{HttpRequest, Method};
pub use response::{Body, HttpResponse, TEXT_CSS, TEXT_HTML, TEXT_PLAIN};

use thiserror_no_std::Error;

/// Request bytes that cannot be turned into an [`HttpRequest`].
///
/// The portal drops such connections without answering.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("request has no location")]
    NoLocation,
    #[error("request head is not valid UTF-8")]
    NotUtf8,
    #[error("malformed status line")]
    BadStatusLine,
}
