//! Wall-clock time for token timestamps.

pub mod ntp;

use embedded_hal_async::delay::DelayNs;
use log::{info, warn};
use thiserror_no_std::Error;

use crate::config::{TIME_SYNC_ATTEMPTS, TIME_SYNC_RETRY_MS};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeSyncError {
    #[error("no reply from time server")]
    Timeout,
    #[error("time server unreachable")]
    Network,
    #[error("invalid reply: {0}")]
    Reply(#[from] ntp::NtpError),
}

/// Source of current epoch time.
pub trait WallClock {
    /// Queries the network for the current time and adjusts the clock.
    fn sync(&mut self) -> impl Future<Output = Result<(), TimeSyncError>>;

    /// Current Unix time in milliseconds.
    fn now_ms(&self) -> u64;
}

/// Tries to synchronise the clock, pausing between attempts.
///
/// Returns `false` if every attempt failed; the clock is then left as it
/// was and the caller carries on.
pub async fn sync_with_retry<C: WallClock, D: DelayNs>(clock: &mut C, delay: &mut D) -> bool {
    for attempt in 1..=TIME_SYNC_ATTEMPTS {
        match clock.sync().await {
            Ok(()) => {
                info!("Time synchronized: {} ms", clock.now_ms());
                return true;
            }
            Err(e) => {
                warn!("Time sync attempt {}/{} failed: {}", attempt, TIME_SYNC_ATTEMPTS, e);
                if attempt < TIME_SYNC_ATTEMPTS {
                    delay.delay_ms(TIME_SYNC_RETRY_MS).await;
                }
            }
        }
    }
    warn!("Continuing without synchronized time");
    false
}
