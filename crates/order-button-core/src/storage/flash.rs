use alloc::vec;

use embedded_storage::Storage;
use log::{debug, info};

use super::record::{self, RECORD_SIZE};
use super::{CredentialStore, Credentials, StorageError, StorageResult};

/// Credentials kept in a single record at a fixed offset of a flash device.
pub struct FlashCredentialStore<S> {
    flash: S,
    offset: u32,
}

impl<S: Storage> FlashCredentialStore<S> {
    pub fn new(flash: S, offset: u32) -> Self {
        Self { flash, offset }
    }

    pub fn into_inner(self) -> S {
        self.flash
    }
}

impl<S: Storage> CredentialStore for FlashCredentialStore<S> {
    fn load(&mut self) -> StorageResult<Credentials> {
        let mut buf = vec![0u8; RECORD_SIZE];
        self.flash
            .read(self.offset, &mut buf)
            .map_err(|_| StorageError::Read)?;
        let credentials = record::decode(&buf)?;
        debug!("Loaded credentials for SSID {:?}", credentials.ssid);
        Ok(credentials)
    }

    fn store(&mut self, credentials: &Credentials) -> StorageResult<()> {
        let buf = record::encode(credentials)?;
        self.flash
            .write(self.offset, &buf)
            .map_err(|_| StorageError::Write)?;
        info!("Stored credentials for SSID {:?}", credentials.ssid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RamFlash;

    #[test]
    fn test_blank_flash_loads_empty() {
        let mut store = FlashCredentialStore::new(RamFlash::erased(4096), 1024);
        assert_eq!(store.load().unwrap(), Credentials::default());
    }

    #[test]
    fn test_store_then_load() {
        let mut store = FlashCredentialStore::new(RamFlash::erased(4096), 1024);
        store.store(&Credentials::new("Home", "pw")).unwrap();
        assert_eq!(store.load().unwrap(), Credentials::new("Home", "pw"));

        let flash = store.into_inner();
        assert!(flash.0[..1024].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_out_of_range_offset() {
        let mut store = FlashCredentialStore::new(RamFlash::erased(128), 0);
        assert_eq!(store.load(), Err(StorageError::Read));
        assert_eq!(
            store.store(&Credentials::new("a", "b")),
            Err(StorageError::Write)
        );
    }
}
