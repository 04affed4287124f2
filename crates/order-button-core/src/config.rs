//! Device configuration and compile-time defaults.
//!
//! Platform crates build a [`DeviceConfig`] from [`DeviceConfig::default`]
//! and override what their environment provides (endpoint, claim identity).

use serde::{Deserialize, Serialize};

/// SSID broadcast while the configuration portal is up
pub const AP_SSID: &str = "UberEatsButton";

/// WPA2 passphrase of the configuration access point
pub const AP_PASSWORD: &str = "sneakybutton";

/// Value of the `Server` header on every portal response
pub const SERVER_NAME: &str = "Fluffy HTTP Server :3 (order-button, ESP32-S3)";

/// Portal listening port
pub const PORTAL_PORT: u16 = 80;

/// Largest request the portal reads from a connection, in bytes
pub const REQUEST_BUFFER_SIZE: usize = 4096;

/// Chunk size used when streaming large assets
pub const STREAM_CHUNK_SIZE: usize = 4096;

/// Failed link checks tolerated before falling back to the portal
pub const MAX_CONNECT_ATTEMPTS: u32 = 10;

/// Base of the exponential connection backoff, in milliseconds
pub const BACKOFF_BASE_MS: u64 = 100;

/// Button poll interval while connected
pub const POLL_INTERVAL_MS: u32 = 50;

/// How long the LED stays lit after the link comes up
pub const CONNECTED_HOLD_MS: u32 = 3_000;

/// Grace period between the confirmation page and closing the portal
pub const PORTAL_GRACE_MS: u32 = 2_000;

/// Lifetime of a signed order token
pub const TOKEN_LIFETIME_MS: u64 = 60_000;

/// Fallback NTP server (IPv4) and port
pub const NTP_SERVER: [u8; 4] = [69, 89, 207, 199];
pub const NTP_PORT: u16 = 123;

/// Time sync attempts before continuing unsynchronised
pub const TIME_SYNC_ATTEMPTS: u32 = 5;

/// Delay between time sync attempts
pub const TIME_SYNC_RETRY_MS: u32 = 2_000;

/// Where signed orders are sent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct EndpointConfig<'a> {
    pub host: &'a str,
    pub port: u16,
    pub path: &'a str,
}

impl Default for EndpointConfig<'_> {
    fn default() -> Self {
        Self {
            host: "duststorm.ocf.berkeley.edu",
            port: 80,
            path: "/order",
        }
    }
}

/// Fixed identity claims carried by every order token.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct ClaimsConfig<'a> {
    pub subject: &'a str,
    pub issuer: &'a str,
    pub audience: &'a str,
}

impl Default for ClaimsConfig<'_> {
    fn default() -> Self {
        Self {
            subject: "random-order",
            issuer: "uber-eats-client.ben9583.com",
            audience: "uber-eats-server.ben9583.com",
        }
    }
}

/// Access point parameters for the configuration portal.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct AccessPointConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

impl Default for AccessPointConfig<'_> {
    fn default() -> Self {
        Self {
            ssid: AP_SSID,
            password: AP_PASSWORD,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct DeviceConfig<'a> {
    pub endpoint: EndpointConfig<'a>,
    pub claims: ClaimsConfig<'a>,
    pub access_point: AccessPointConfig<'a>,
}
