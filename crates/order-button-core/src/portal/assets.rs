//! Static portal content, compiled into the image.

/// Configuration form served at `/`
pub const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Confirmation page sent after a successful submission
pub const CONNECT_HTML: &str = include_str!("../../assets/connect.html");

/// Stylesheet shared by both pages. Larger than one stream chunk, so it is
/// always sent in pieces.
pub const STYLESHEET: &[u8] = include_bytes!("../../assets/style.css");

pub const STYLESHEET_PATH: &str = "/style.css";
