//! Signed order requests.
//!
//! Each press produces a fresh token (`jti` from the RNG, `iat` = now,
//! `exp` = now + 60 s) carried as `Authorization: Bearer <token>` on a
//! body-less `PUT` to the order endpoint.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;

use embedded_io_async::{Read, Write};
use log::{info, warn};
use rand_core::RngCore;
use thiserror_no_std::Error;

use crate::config::{ClaimsConfig, EndpointConfig, TOKEN_LIFETIME_MS};
use crate::http::{OutboundRequest, parse_status_line};
use crate::jwt::{self, JwtClaims, JwtError};

/// Bytes read from the reply, enough for the status line
const REPLY_HEAD_SIZE: usize = 128;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum TransportError {
    #[error("endpoint name could not be resolved")]
    Resolve,
    #[error("could not connect to the endpoint")]
    Connect,
    #[error("sending the request failed")]
    Send,
    #[error("no valid HTTP reply")]
    Reply,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
    #[error("signing failed: {0}")]
    Signing(#[from] JwtError),
}

/// Delivers an outbound request and reports the reply status.
pub trait OrderTransport {
    fn send(
        &mut self,
        request: &OutboundRequest<'_>,
    ) -> impl Future<Output = Result<u16, TransportError>>;
}

/// Writes `request` on an open connection and reads back the status code.
///
/// Shared by the platform transports once they hold a connected stream.
pub async fn exchange<C: Read + Write>(
    conn: &mut C,
    request: &OutboundRequest<'_>,
) -> Result<u16, TransportError> {
    conn.write_all(request.encode().as_bytes())
        .await
        .map_err(|_| TransportError::Send)?;
    conn.flush().await.map_err(|_| TransportError::Send)?;

    let mut head = [0u8; REPLY_HEAD_SIZE];
    let mut len = 0;
    while len < head.len() {
        let n = conn
            .read(&mut head[len..])
            .await
            .map_err(|_| TransportError::Reply)?;
        if n == 0 {
            break;
        }
        len += n;
        if head[..len].windows(2).any(|w| w == b"\r\n") {
            break;
        }
    }
    parse_status_line(&head[..len]).map_err(|_| TransportError::Reply)
}

/// Renders `bytes` as lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Builds and signs order tokens.
pub struct OrderSigner<'a> {
    secret: Vec<u8>,
    claims: ClaimsConfig<'a>,
    endpoint: EndpointConfig<'a>,
}

impl<'a> OrderSigner<'a> {
    pub fn new(secret: Vec<u8>, claims: ClaimsConfig<'a>, endpoint: EndpointConfig<'a>) -> Self {
        Self {
            secret,
            claims,
            endpoint,
        }
    }

    /// Claims for an order placed at `now_ms` with a random 128-bit id.
    pub fn claims<R: RngCore>(&self, rng: &mut R, now_ms: u64) -> JwtClaims {
        let mut id = [0u8; 16];
        rng.fill_bytes(&mut id);
        JwtClaims {
            sub: self.claims.subject.into(),
            iss: self.claims.issuer.into(),
            aud: self.claims.audience.into(),
            jti: to_hex(&id),
            iat: now_ms,
            exp: now_ms + TOKEN_LIFETIME_MS,
        }
    }

    /// `Bearer <token>` for `claims`.
    pub fn authorization(&self, claims: &JwtClaims) -> Result<String, JwtError> {
        let token = jwt::encode(&self.secret, claims)?;
        let mut value = String::with_capacity(token.len() + 7);
        value.push_str("Bearer ");
        value.push_str(&token);
        Ok(value)
    }

    /// Signs a new order and sends it.
    ///
    /// Any HTTP status counts as delivered; a non-2xx status is only
    /// logged. Returns the status on delivery.
    pub async fn place<T, R>(
        &self,
        transport: &mut T,
        rng: &mut R,
        now_ms: u64,
    ) -> Result<u16, OrderError>
    where
        T: OrderTransport,
        R: RngCore,
    {
        let claims = self.claims(rng, now_ms);
        let authorization = self.authorization(&claims)?;
        let request =
            OutboundRequest::put(self.endpoint.host, self.endpoint.port, self.endpoint.path)
                .with_authorization(&authorization);

        info!(
            "Placing order {} at {}:{}{}",
            claims.jti, self.endpoint.host, self.endpoint.port, self.endpoint.path
        );
        let status = transport.send(&request).await?;
        if (200..300).contains(&status) {
            info!("Order accepted with status {}", status);
        } else {
            warn!("Order endpoint answered {}", status);
        }
        Ok(status)
    }
}
