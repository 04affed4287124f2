//! Persisted WiFi credentials and the signing secret.
//!
//! The controller only sees the [`CredentialStore`] and [`SecretStore`]
//! traits. [`FlashCredentialStore`] keeps credentials in one record on any
//! `embedded-storage` device; [`MemoryStore`] is the in-RAM version.

mod flash;
pub mod record;

pub use flash::FlashCredentialStore;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// Maximum SSID length accepted by 802.11
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Station credentials. Empty when nothing has been configured yet.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub ssid: String,
    pub password: String,
}

impl Credentials {
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            password: password.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ssid.is_empty()
    }

    /// Whether both fields are within what a station can use.
    pub fn fits_limits(&self) -> bool {
        self.ssid.len() <= MAX_SSID_LEN && self.password.len() <= MAX_PASSWORD_LEN
    }
}

// Passwords never reach the log
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage device read failed")]
    Read,
    #[error("storage device write failed")]
    Write,
    #[error("stored record failed its checksum")]
    Corrupted,
    #[error("record could not be encoded: {0}")]
    Encode(postcard::Error),
    #[error("credentials do not fit in a record")]
    TooLarge,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Write-through store for the station credentials.
pub trait CredentialStore {
    /// Returns the stored credentials, empty if none were ever stored.
    fn load(&mut self) -> StorageResult<Credentials>;

    /// Persists `credentials`, replacing what was stored.
    fn store(&mut self, credentials: &Credentials) -> StorageResult<()>;
}

/// Source of the HMAC key, read once at startup.
pub trait SecretStore {
    fn load_secret(&mut self) -> StorageResult<Vec<u8>>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for &mut T {
    fn load(&mut self) -> StorageResult<Credentials> {
        (**self).load()
    }

    fn store(&mut self, credentials: &Credentials) -> StorageResult<()> {
        (**self).store(credentials)
    }
}

/// A secret known when the image is built or the process starts.
pub struct FixedSecret(Vec<u8>);

impl FixedSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }
}

impl SecretStore for FixedSecret {
    fn load_secret(&mut self) -> StorageResult<Vec<u8>> {
        Ok(self.0.clone())
    }
}

/// Credential store kept in RAM. Enforces the same field limits as a
/// flash record.
#[derive(Debug, Default)]
pub struct MemoryStore {
    credentials: Credentials,
    writes: usize,
}

impl MemoryStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            writes: 0,
        }
    }

    /// Number of successful [`store`](CredentialStore::store) calls.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl CredentialStore for MemoryStore {
    fn load(&mut self) -> StorageResult<Credentials> {
        Ok(self.credentials.clone())
    }

    fn store(&mut self, credentials: &Credentials) -> StorageResult<()> {
        if !credentials.fits_limits() {
            return Err(StorageError::TooLarge);
        }
        self.credentials = credentials.clone();
        self.writes += 1;
        Ok(())
    }
}
