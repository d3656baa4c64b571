//! Standard RFC 4648 base64, no URL-safe alphabet (§4.A).

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::{Error, Result};

pub fn decode(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| Error::CodecError(format!("base64 decode failed: {e}")))
}

pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let data = b"AAECAwQFBgcICQ==not-real-but-bytes";
        let encoded = encode(data);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(decode("not!!valid==base64").is_err());
    }
}
