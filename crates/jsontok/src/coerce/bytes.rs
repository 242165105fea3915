use alloc::{format, string::String, vec::Vec};

use base64::{Engine, engine::general_purpose::STANDARD};
use uuid::Uuid;

/// Length of a hyphenated GUID such as `d8d2b6b4-0a2e-4b8f-9c1b-2f1f0f6a9e3c`.
const GUID_LEN: usize = 36;

/// Decodes the payload of a quoted byte string.
///
/// A canonical GUID yields its 16 bytes in the mixed-endian order GUIDs use
/// on the wire; every other non-empty string is standard Base64.
pub(crate) fn bytes_from_text(text: &str) -> Result<Vec<u8>, String> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    if text.len() == GUID_LEN {
        if let Ok(guid) = Uuid::try_parse(text) {
            return Ok(guid.to_bytes_le().to_vec());
        }
    }
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| format!("Could not decode Base64 string '{text}': {e}."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_ignores_whitespace() {
        assert_eq!(bytes_from_text("SGVs\nbG8=").unwrap(), b"Hello");
    }

    #[test]
    fn guid_uses_mixed_endian_layout() {
        let bytes = bytes_from_text("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        assert_eq!(
            bytes,
            [
                0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xaa, 0xbb, 0xcc,
                0xdd, 0xee, 0xff
            ]
        );
    }

    #[test]
    fn empty_and_invalid() {
        assert!(bytes_from_text("").unwrap().is_empty());
        assert!(bytes_from_text("not base64!").is_err());
    }
}
