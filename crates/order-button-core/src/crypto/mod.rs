//! Cryptographic building blocks for request signing.

pub mod base64url;
pub mod hmac;

pub use hmac::{HmacSha256, sign};

/// Compares two byte strings in time independent of where they first differ.
///
/// Length is not secret; slices of different length compare unequal
/// immediately.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    core::hint::black_box(diff) == 0
}
