use thiserror_no_std::Error;

use crate::config::AccessPointConfig;
use crate::storage::Credentials;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum LinkError {
    #[error("radio rejected the configuration")]
    Config,
    #[error("radio failed to start")]
    Start,
    #[error("association request failed")]
    Connect,
}

/// The WiFi radio as seen by the controller.
pub trait WifiLink {
    /// Switches to station mode with `credentials` and starts associating.
    ///
    /// Returns once the attempt is under way; completion is observed
    /// through [`is_connected`](Self::is_connected).
    fn begin_station(
        &mut self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<(), LinkError>>;

    /// Whether the station is associated and has an address.
    fn is_connected(&mut self) -> impl Future<Output = bool>;

    /// Switches to access-point mode for the configuration portal.
    fn start_access_point(
        &mut self,
        config: &AccessPointConfig<'_>,
    ) -> impl Future<Output = Result<(), LinkError>>;
}
