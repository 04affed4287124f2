//! SNTP client packet codec (RFC 4330), transport-agnostic.

use thiserror_no_std::Error;

pub const NTP_PACKET_SIZE: usize = 48;

/// Seconds between 1900-01-01 and 1970-01-01
pub const NTP_EPOCH_OFFSET: u64 = 2_208_988_800;

const TRANSMIT_TIMESTAMP: usize = 40;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum NtpError {
    #[error("reply is {0} bytes, expected 48")]
    ShortPacket(usize),
    #[error("reply is not a server message")]
    NotServer,
    #[error("server is unsynchronized")]
    Unsynchronized,
    #[error("timestamp precedes the Unix epoch")]
    InvalidTimestamp,
}

/// Client request: LI = 0, VN = 4, Mode = 3, everything else zero.
pub fn request() -> [u8; NTP_PACKET_SIZE] {
    let mut packet = [0u8; NTP_PACKET_SIZE];
    packet[0] = 0b00_100_011;
    packet
}

/// Unix time in milliseconds from the transmit timestamp of a server reply.
pub fn parse_reply(reply: &[u8]) -> Result<u64, NtpError> {
    if reply.len() < NTP_PACKET_SIZE {
        return Err(NtpError::ShortPacket(reply.len()));
    }
    // Mode 4 (server) or 5 (broadcast)
    let mode = reply[0] & 0b111;
    if mode != 4 && mode != 5 {
        return Err(NtpError::NotServer);
    }
    // Leap indicator 3 means the server clock is not set
    if reply[0] >> 6 == 3 {
        return Err(NtpError::Unsynchronized);
    }

    let ts = &reply[TRANSMIT_TIMESTAMP..TRANSMIT_TIMESTAMP + 8];
    let seconds = u32::from_be_bytes([ts[0], ts[1], ts[2], ts[3]]) as u64;
    let fraction = u32::from_be_bytes([ts[4], ts[5], ts[6], ts[7]]) as u64;

    let unix_seconds = seconds
        .checked_sub(NTP_EPOCH_OFFSET)
        .ok_or(NtpError::InvalidTimestamp)?;
    Ok(unix_seconds * 1000 + ((fraction * 1000) >> 32))
}
