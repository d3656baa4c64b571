//! zstd compression, grounded on the teacher's `zstd::bulk`/`zstd::stream`
//! usage in its own container codec (§4.A).

use std::io::Cursor;

use crate::error::{Error, Result};

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    zstd::stream::decode_all(Cursor::new(bytes))
        .map_err(|e| Error::CodecError(format!("zstd decompress failed: {e}")))
}

pub fn compress(bytes: &[u8], level: i32) -> Result<Vec<u8>> {
    zstd::stream::encode_all(Cursor::new(bytes), level)
        .map_err(|e| Error::CodecError(format!("zstd compress failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(8);
        let compressed = compress(&data, 3).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn rejects_garbage_input() {
        let garbage = vec![0xde, 0xad, 0xbe, 0xef, 1, 2, 3];
        assert!(decompress(&garbage).is_err());
    }
}
