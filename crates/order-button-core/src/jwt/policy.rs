//! Acceptance policy applied by the order endpoint after [`decode`](super::decode).

use alloc::string::String;

use heapless::Deque;
use thiserror_no_std::Error;

use super::JwtClaims;
use crate::config::ClaimsConfig;

/// Number of recently accepted token ids remembered for replay detection
pub const REPLAY_CACHE_SIZE: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("audience, issuer or subject does not match")]
    WrongIdentity,
    #[error("token has no id")]
    MissingId,
    #[error("token is not yet valid")]
    NotYetValid,
    #[error("token has expired")]
    Expired,
    #[error("token id was already used")]
    Replayed,
}

/// Bounded set of token ids already accepted.
///
/// Oldest ids are evicted first once the cache is full; tokens live for a
/// minute, so the window only has to cover ids that could still be valid.
pub struct ReplayCache<const N: usize = REPLAY_CACHE_SIZE> {
    seen: Deque<String, N>,
}

impl<const N: usize> ReplayCache<N> {
    pub const fn new() -> Self {
        Self { seen: Deque::new() }
    }

    pub fn contains(&self, jti: &str) -> bool {
        self.seen.iter().any(|seen| seen == jti)
    }

    /// Records `jti`, evicting the oldest entry when full.
    pub fn insert(&mut self, jti: &str) {
        if self.seen.is_full() {
            self.seen.pop_front();
        }
        // Cannot fail, a slot was freed above
        let _ = self.seen.push_back(String::from(jti));
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl<const N: usize> Default for ReplayCache<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks decoded claims against the expected identity, the validity window
/// and previously accepted token ids.
pub struct ClaimsPolicy<'a, const N: usize = REPLAY_CACHE_SIZE> {
    expected: ClaimsConfig<'a>,
    replay: ReplayCache<N>,
}

impl<'a, const N: usize> ClaimsPolicy<'a, N> {
    pub fn new(expected: ClaimsConfig<'a>) -> Self {
        Self {
            expected,
            replay: ReplayCache::new(),
        }
    }

    /// Accepts `claims` at `now_ms` and marks the token id as used.
    ///
    /// A rejected token is never recorded, so a replay check only trips on
    /// tokens that were accepted before.
    pub fn accept(&mut self, claims: &JwtClaims, now_ms: u64) -> Result<(), ClaimsError> {
        if claims.aud != self.expected.audience
            || claims.iss != self.expected.issuer
            || claims.sub != self.expected.subject
        {
            return Err(ClaimsError::WrongIdentity);
        }
        if claims.jti.is_empty() {
            return Err(ClaimsError::MissingId);
        }
        if claims.iat > now_ms {
            return Err(ClaimsError::NotYetValid);
        }
        if claims.exp < now_ms {
            return Err(ClaimsError::Expired);
        }
        if self.replay.contains(&claims.jti) {
            return Err(ClaimsError::Replayed);
        }
        self.replay.insert(&claims.jti);
        Ok(())
    }
}
