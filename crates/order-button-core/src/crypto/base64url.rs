//! Unpadded base64url (RFC 4648 §5), the segment encoding of compact JWTs.

use alloc::string::String;
use alloc::vec::Vec;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

pub use base64::DecodeError;

/// `-`/`_` alphabet, never emits `=`, accepts input with or without padding.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes bytes as base64url text without trailing padding.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    ENGINE.encode(bytes)
}

/// Decodes base64url text, padded or not.
pub fn decode(text: impl AsRef<[u8]>) -> Result<Vec<u8>, DecodeError> {
    ENGINE.decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uses_url_alphabet_without_padding() {
        // 0xfb 0xff encodes to "+/8=" in the standard alphabet
        assert_eq!(encode([0xfb, 0xff]), "-_8");
        assert_eq!(encode(b"f"), "Zg");
        assert_eq!(encode(b"fo"), "Zm8");
        assert_eq!(encode(b"foo"), "Zm9v");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(encode(b""), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_accepts_padded_and_unpadded() {
        assert_eq!(decode("Zg").unwrap(), b"f");
        assert_eq!(decode("Zg==").unwrap(), b"f");
        assert_eq!(decode("-_8").unwrap(), [0xfb, 0xff]);
    }

    #[test]
    fn test_round_trip_every_length_remainder() {
        let data: Vec<u8> = (0..=255u8).collect();
        for len in 0..70 {
            let slice = &data[186..186 + len];
            let text = encode(slice);
            assert!(!text.contains(['+', '/', '=']));
            assert_eq!(decode(&text).unwrap(), slice);
        }
    }

    #[test]
    fn test_decode_rejects_standard_alphabet() {
        assert!(decode("+/8").is_err());
        assert!(decode("a").is_err());
    }
}
