//! Compact HS256 JSON Web Tokens with a single fixed claim shape.
//!
//! Tokens are `base64url(header).base64url(claims).base64url(hmac)` where
//! the header is always `{"alg":"HS256","typ":"JWT"}` and the signature is
//! HMAC-SHA256 over the first two segments joined by `.`.
//!
//! [`decode`] only authenticates and parses. Expiry, audience and replay
//! checks live in [`ClaimsPolicy`].

mod policy;

pub use policy::{ClaimsError, ClaimsPolicy, ReplayCache};

use alloc::string::String;
use alloc::vec;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::crypto::{self, base64url};

/// Claims carried by an order token. `iat` and `exp` are epoch milliseconds.
///
/// Field order is the JSON serialization order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JwtClaims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub jti: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Serialize)]
struct JwtHeader {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: JwtHeader = JwtHeader {
    alg: "HS256",
    typ: "JWT",
};

/// Room for keys, punctuation and two 20-digit integers
const JSON_OVERHEAD: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("token does not have exactly three segments")]
    MalformedToken,
    #[error("token signature does not match")]
    SignatureInvalid,
    #[error("token payload is not valid claims JSON")]
    MalformedPayload,
    #[error("claims could not be serialized")]
    Serialize,
}

pub type JwtResult<T> = Result<T, JwtError>;

/// Signs `claims` with `secret` and returns the compact token.
pub fn encode(secret: &[u8], claims: &JwtClaims) -> JwtResult<String> {
    let header = base64url::encode(to_json(&HEADER, 0)?);
    let payload = base64url::encode(to_json(claims, claims_text_len(claims))?);

    let mut token = String::with_capacity(header.len() + payload.len() + 45);
    token.push_str(&header);
    token.push('.');
    token.push_str(&payload);

    let signature = crypto::sign(secret, token.as_bytes());
    token.push('.');
    token.push_str(&base64url::encode(signature));
    Ok(token)
}

/// Verifies the signature of `token` under `secret` and parses its claims.
pub fn decode(secret: &[u8], token: &str) -> JwtResult<JwtClaims> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(JwtError::MalformedToken);
    };

    let signing_input = &token[..header.len() + 1 + payload.len()];
    let expected = crypto::sign(secret, signing_input.as_bytes());
    let provided = base64url::decode(signature).map_err(|_| JwtError::SignatureInvalid)?;
    if !crypto::constant_time_eq(&expected, &provided) {
        return Err(JwtError::SignatureInvalid);
    }

    let json = base64url::decode(payload).map_err(|_| JwtError::MalformedPayload)?;
    // Unescaped strings are never longer than the JSON they came from
    let mut scratch = vec![0u8; json.len()];
    let (claims, _) = serde_json_core::from_slice_escaped::<JwtClaims>(&json, &mut scratch)
        .map_err(|_| JwtError::MalformedPayload)?;
    Ok(claims)
}

fn claims_text_len(claims: &JwtClaims) -> usize {
    claims.sub.len() + claims.iss.len() + claims.aud.len() + claims.jti.len()
}

/// Serializes into a buffer large enough for every string to be fully
/// `\u00XX`-escaped.
fn to_json<T: Serialize>(value: &T, text_len: usize) -> JwtResult<vec::Vec<u8>> {
    let mut buf = vec![0u8; JSON_OVERHEAD + text_len * 6];
    let len = serde_json_core::to_slice(value, &mut buf).map_err(|_| JwtError::Serialize)?;
    buf.truncate(len);
    Ok(buf)
}
