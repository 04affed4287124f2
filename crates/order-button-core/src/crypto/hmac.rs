//! HMAC-SHA256 (RFC 2104) over the `sha2` digest.
//!
//! The context is keyed once and then fed incrementally, so a message
//! arriving in several chunks signs the same as the concatenation:
//!
//! ```rust,ignore
//! let mut mac = HmacSha256::new(b"secret");
//! mac.update(b"header.");
//! mac.update(b"payload");
//! let tag: [u8; 32] = mac.finalize();
//! ```

use sha2::{Digest, Sha256};

/// SHA-256 block size in bytes
pub const BLOCK_SIZE: usize = 64;

/// HMAC-SHA256 output size in bytes
pub const DIGEST_SIZE: usize = 32;

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5C;

/// Keyed HMAC-SHA256 context.
///
/// Holds the inner digest (already fed with `key ^ ipad`) and the outer
/// digest (already fed with `key ^ opad`). A context is consumed by
/// [`finalize`](Self::finalize) and never reused across messages.
pub struct HmacSha256 {
    inner: Sha256,
    outer: Sha256,
}

impl HmacSha256 {
    /// Derives a context from arbitrary key material.
    ///
    /// Keys longer than one block are replaced by their SHA-256 hash, then
    /// every key is right-padded with zeros to the block size.
    pub fn new(key: &[u8]) -> Self {
        let mut block = [0u8; BLOCK_SIZE];
        if key.len() > BLOCK_SIZE {
            block[..DIGEST_SIZE].copy_from_slice(&Sha256::digest(key));
        } else {
            block[..key.len()].copy_from_slice(key);
        }

        let mut inner_pad = [0u8; BLOCK_SIZE];
        let mut outer_pad = [0u8; BLOCK_SIZE];
        for (i, byte) in block.iter().enumerate() {
            inner_pad[i] = byte ^ IPAD;
            outer_pad[i] = byte ^ OPAD;
        }

        let mut inner = Sha256::new();
        inner.update(inner_pad);
        let mut outer = Sha256::new();
        outer.update(outer_pad);

        Self { inner, outer }
    }

    /// Feeds another chunk of the message into the inner digest.
    pub fn update(&mut self, message: &[u8]) {
        self.inner.update(message);
    }

    /// Completes the inner digest and returns `H(key ^ opad || inner)`.
    pub fn finalize(self) -> [u8; DIGEST_SIZE] {
        let Self { inner, mut outer } = self;
        outer.update(inner.finalize());
        outer.finalize().into()
    }
}

/// One-shot HMAC-SHA256 of `message` under `key`.
pub fn sign(key: &[u8], message: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut mac = HmacSha256::new(key);
    mac.update(message);
    mac.finalize()
}
