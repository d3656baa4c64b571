//! Binary-array decoder (§4.B): resolves the compression + numeric-type CV
//! pair on a `<binaryDataArray>` and drives the codec chain described by the
//! dispatch table. Grounded on the sibling `mzpeak-rs` crate's
//! `mzml/binary.rs` (base64 → decompress → reinterpret pipeline shape),
//! extended here for zstd and the full numpress matrix per §4.B.

use crate::codec;
use crate::cv::{ByteCompression, Compression, NumericType, Numpress};
use crate::error::{emit, Error, Result, Warning};
use crate::model::{BinaryDataArray, CvParam};

/// Resolve the compression accession present on `array`, defaulting to "no
/// compression" with a warning when absent (§4.B).
fn resolve_compression(array: &BinaryDataArray, warnings: &mut Vec<Warning>) -> Result<Compression> {
    let found = array
        .cv_params
        .iter()
        .find_map(|p| p.accession.as_deref().and_then(Compression::from_accession));

    match found {
        Some(compression) => Ok(compression),
        None => {
            emit(warnings, Warning::MissingCompression);
            Ok(Compression::Plain(ByteCompression::None))
        }
    }
}

/// Resolve the numeric-type accession, defaulting to 64-bit float with a
/// warning when absent (§4.B).
fn resolve_numeric_type(array: &BinaryDataArray, warnings: &mut Vec<Warning>) -> NumericType {
    for p in &array.cv_params {
        if let Some(acc) = p.accession.as_deref() {
            if let Some(t) = NumericType::from_accession(acc) {
                return t;
            }
        }
    }
    emit(warnings, Warning::MissingNumericType);
    NumericType::Float64
}

fn decompress_bytes(bytes: Vec<u8>, stage: ByteCompression) -> Result<Vec<u8>> {
    match stage {
        ByteCompression::None => Ok(bytes),
        ByteCompression::Zlib => codec::zlib::decompress(&bytes),
        ByteCompression::Zstd => codec::zstd::decompress(&bytes),
    }
}

/// Decode a `<binaryDataArray>` into its widened `f64` sequence, applying
/// the full pipeline: base64 decode, numpress-aware decompression, and
/// reinterpretation per the declared (or defaulted) numeric type.
///
/// An empty `<binary>` element decodes to an empty sequence with an
/// [`Warning::EmptyPayload`] warning, never an error (§4.B edge case).
pub fn decode(array: &BinaryDataArray, warnings: &mut Vec<Warning>) -> Result<Vec<f64>> {
    if array.binary.trim().is_empty() {
        emit(warnings, Warning::EmptyPayload);
        return Ok(Vec::new());
    }

    let compression = resolve_compression(array, warnings)?;
    let numeric_type = resolve_numeric_type(array, warnings);
    let raw = codec::base64::decode(&array.binary)?;

    let values = match compression {
        Compression::Plain(stage) => {
            let bytes = decompress_bytes(raw, stage)?;
            codec::widen(&bytes, numeric_type)?
        }
        Compression::TruncationZlib => {
            let bytes = decompress_bytes(raw, ByteCompression::Zlib)?;
            codec::widen(&bytes, numeric_type)?
        }
        Compression::Numpress(scheme, stage) => {
            let bytes = decompress_bytes(raw, stage)?;
            match scheme {
                Numpress::Linear => codec::numpress::decode_linear(&bytes, array.array_length)?,
                Numpress::PositiveInteger => {
                    codec::numpress::decode_pic(&bytes, array.array_length)?
                }
                Numpress::ShortLoggedFloat => {
                    codec::numpress::decode_slof(&bytes, array.array_length)?
                }
            }
        }
        Compression::Rejected(_) => {
            return Err(Error::UnsupportedFeature(format!(
                "compression accession {} is not decodable",
                compression.accession()
            )));
        }
    };

    if let Some(expected) = array.array_length {
        if expected != values.len() {
            return Err(Error::FormatError(format!(
                "declared array length {expected} does not match decoded length {}",
                values.len()
            )));
        }
    }

    Ok(values)
}
