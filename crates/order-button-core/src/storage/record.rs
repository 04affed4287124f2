//! On-flash credential record.
//!
//! Fixed-size, little-endian layout:
//! - magic: 4 bytes (`RECORD_MAGIC`)
//! - version: 1 byte
//! - payload length: 2 bytes
//! - payload: postcard-encoded [`Credentials`]
//! - CRC-32 of everything before it: 4 bytes
//! - `0xFF` fill up to [`RECORD_SIZE`]

use alloc::vec::Vec;

use log::warn;

use super::{Credentials, StorageError, StorageResult};

pub const RECORD_MAGIC: u32 = 0x4E54_4243;
pub const RECORD_VERSION: u8 = 1;
pub const RECORD_SIZE: usize = 256;

const HEADER_LEN: usize = 7;
const CRC_LEN: usize = 4;

/// Serializes `credentials` into a full record.
pub fn encode(credentials: &Credentials) -> StorageResult<Vec<u8>> {
    if !credentials.fits_limits() {
        return Err(StorageError::TooLarge);
    }
    let payload = postcard::to_allocvec(credentials).map_err(StorageError::Encode)?;
    if HEADER_LEN + payload.len() + CRC_LEN > RECORD_SIZE {
        return Err(StorageError::TooLarge);
    }

    let mut record = Vec::with_capacity(RECORD_SIZE);
    record.extend_from_slice(&RECORD_MAGIC.to_le_bytes());
    record.push(RECORD_VERSION);
    record.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    record.extend_from_slice(&payload);
    let crc = crc32fast::hash(&record);
    record.extend_from_slice(&crc.to_le_bytes());
    record.resize(RECORD_SIZE, 0xFF);
    Ok(record)
}

/// Reads a record back.
///
/// Erased flash, a foreign magic or an unknown version read as empty
/// credentials; a record of ours that fails its checksum is an error.
pub fn decode(record: &[u8]) -> StorageResult<Credentials> {
    if record.len() < HEADER_LEN + CRC_LEN || record.iter().all(|&byte| byte == 0xFF) {
        return Ok(Credentials::default());
    }
    if u32::from_le_bytes([record[0], record[1], record[2], record[3]]) != RECORD_MAGIC {
        warn!("Credential record has unknown magic, treating as empty");
        return Ok(Credentials::default());
    }
    if record[4] != RECORD_VERSION {
        warn!("Credential record version {} unsupported, treating as empty", record[4]);
        return Ok(Credentials::default());
    }

    let payload_len = u16::from_le_bytes([record[5], record[6]]) as usize;
    let crc_at = HEADER_LEN + payload_len;
    if crc_at + CRC_LEN > record.len() {
        return Err(StorageError::Corrupted);
    }
    let stored_crc = u32::from_le_bytes([
        record[crc_at],
        record[crc_at + 1],
        record[crc_at + 2],
        record[crc_at + 3],
    ]);
    if crc32fast::hash(&record[..crc_at]) != stored_crc {
        return Err(StorageError::Corrupted);
    }

    postcard::from_bytes(&record[HEADER_LEN..crc_at]).map_err(|_| StorageError::Corrupted)
}
