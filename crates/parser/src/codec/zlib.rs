//! zlib-wrapped DEFLATE, grounded on the teacher's use of `miniz_oxide` for
//! its own container codec (§4.A).

use miniz_oxide::deflate::compress_to_vec_zlib;
use miniz_oxide::inflate::decompress_to_vec_zlib;

use crate::error::{Error, Result};

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    decompress_to_vec_zlib(bytes)
        .map_err(|e| Error::CodecError(format!("zlib inflate failed: {e:?}")))
}

pub fn compress(bytes: &[u8], level: u8) -> Vec<u8> {
    compress_to_vec_zlib(bytes, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(8);
        let compressed = compress(&data, 6);
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn rejects_truncated_input() {
        let data = b"some reasonably compressible payload".repeat(4);
        let mut compressed = compress(&data, 6);
        compressed.truncate(compressed.len() / 2);
        assert!(decompress(&compressed).is_err());
    }
}
