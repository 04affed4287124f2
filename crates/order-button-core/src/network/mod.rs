//! Network-mode state machine.
//!
//! [`NetworkMachine`] is pure bookkeeping: it is told the outcome of each
//! link check and answers with what the controller must do next. The
//! controller in [`crate::device`] performs the sleeping, the portal and the
//! startup sequence.
//!
//! ```text
//! Disconnected ──start──> Connecting(0) ──up──> Connected
//!                           │    ^                 │
//!                     down  │    │ down            │ lost
//!                           v    │                 v
//!                     Connecting(n+1)        Connecting(0)
//!                           │
//!                     n+1 >= 10
//!                           v
//!                        APMode ──portal submission──> Connecting(0)
//! ```

mod link;

pub use link::{LinkError, WifiLink};

use log::{info, warn};

use crate::config::{BACKOFF_BASE_MS, MAX_CONNECT_ATTEMPTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    /// Waiting for the station link; the number of failed checks so far
    Connecting(u32),
    Connected,
    APMode,
}

/// Outcome of a single link check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStep {
    /// The link just came up; run the startup sequence
    Established,
    /// Still connected
    Up,
    /// Connected link went away; station mode restarts from attempt 0
    Lost,
    /// Sleep for `delay_ms`, then check again
    Retry { delay_ms: u64 },
    /// Sleep for `delay_ms`, then bring up the configuration portal
    Exhausted { delay_ms: u64 },
    /// Not in a state that checks the link
    Idle,
}

/// Backoff before the `attempt`-th re-check, `floor(100 * 1.5^attempt)` ms.
pub fn backoff_delay_ms(attempt: u32) -> u64 {
    BACKOFF_BASE_MS * 3u64.pow(attempt) / 2u64.pow(attempt)
}

/// Tracks the connection mode and the station retry counter.
#[derive(Debug)]
pub struct NetworkMachine {
    state: ConnectionState,
    /// Times the portal has been entered since boot
    portal_cycles: u32,
}

impl NetworkMachine {
    pub const fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            portal_cycles: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn portal_cycles(&self) -> u32 {
        self.portal_cycles
    }

    /// `Disconnected -> Connecting(0)`. Has no effect in any other state.
    pub fn start(&mut self) -> ConnectionState {
        if self.state == ConnectionState::Disconnected {
            self.transition(ConnectionState::Connecting(0));
        }
        self.state
    }

    /// Applies the result of polling the station link.
    pub fn on_link_check(&mut self, connected: bool) -> LinkStep {
        match (self.state, connected) {
            (ConnectionState::Connecting(_), true) => {
                self.transition(ConnectionState::Connected);
                LinkStep::Established
            }
            (ConnectionState::Connecting(attempt), false) => {
                let attempt = attempt + 1;
                let delay_ms = backoff_delay_ms(attempt);
                if attempt >= MAX_CONNECT_ATTEMPTS {
                    warn!(
                        "Failed to connect after {} attempts, entering AP mode",
                        attempt
                    );
                    self.portal_cycles += 1;
                    self.transition(ConnectionState::APMode);
                    LinkStep::Exhausted { delay_ms }
                } else {
                    info!(
                        "Not connected, retrying in {} ms ({}/{})",
                        delay_ms, attempt, MAX_CONNECT_ATTEMPTS
                    );
                    self.state = ConnectionState::Connecting(attempt);
                    LinkStep::Retry { delay_ms }
                }
            }
            (ConnectionState::Connected, true) => LinkStep::Up,
            (ConnectionState::Connected, false) => {
                warn!("Station link lost");
                self.transition(ConnectionState::Connecting(0));
                LinkStep::Lost
            }
            (ConnectionState::Disconnected | ConnectionState::APMode, _) => LinkStep::Idle,
        }
    }

    /// `APMode -> Connecting(0)` after the portal accepted new credentials.
    ///
    /// Returns `false` and changes nothing outside `APMode`.
    pub fn on_credentials_submitted(&mut self) -> bool {
        if self.state != ConnectionState::APMode {
            return false;
        }
        self.transition(ConnectionState::Connecting(0));
        true
    }

    fn transition(&mut self, next: ConnectionState) {
        info!("Network state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

impl Default for NetworkMachine {
    fn default() -> Self {
        Self::new()
    }
}
