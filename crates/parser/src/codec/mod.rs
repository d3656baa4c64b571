//! Numeric codec library (§4.A). Pure byte-sequence transforms, each with
//! an inverse; no mzML knowledge lives here.

pub mod base64;
pub mod numpress;
pub mod zlib;
pub mod zstd;

/// Reinterpret a byte slice as a sequence of the declared numeric type and
/// widen every element to `f64` (§4.B "Widening rule"). `len` must be an
/// exact multiple of the type's element size, else a [`crate::error::Error::FormatError`].
pub fn widen(bytes: &[u8], numeric_type: crate::cv::NumericType) -> crate::error::Result<Vec<f64>> {
    use crate::cv::NumericType::*;
    use crate::error::Error;

    let elem = numeric_type.element_size();
    if bytes.len() % elem != 0 {
        return Err(Error::FormatError(format!(
            "payload length {} is not a multiple of element size {}",
            bytes.len(),
            elem
        )));
    }

    Ok(match numeric_type {
        Float32 => bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes(c.try_into().unwrap()) as f64)
            .collect(),
        Float64 => bytes
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
            .collect(),
        Int32 => bytes
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes(c.try_into().unwrap()) as f64)
            .collect(),
        Int64 => bytes
            .chunks_exact(8)
            .map(|c| i64::from_le_bytes(c.try_into().unwrap()) as f64)
            .collect(),
    })
}

/// Inverse of [`widen`]: narrow an `f64` sequence back to the declared
/// numeric type's byte representation. Used by the encode side of P5.
pub fn narrow(values: &[f64], numeric_type: crate::cv::NumericType) -> Vec<u8> {
    use crate::cv::NumericType::*;

    let mut out = Vec::with_capacity(values.len() * numeric_type.element_size());
    match numeric_type {
        Float32 => {
            for &v in values {
                out.extend_from_slice(&(v as f32).to_le_bytes());
            }
        }
        Float64 => {
            for &v in values {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        Int32 => {
            for &v in values {
                out.extend_from_slice(&(v as i32).to_le_bytes());
            }
        }
        Int64 => {
            for &v in values {
                out.extend_from_slice(&(v as i64).to_le_bytes());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::NumericType;

    #[test]
    fn widen_narrow_round_trip_f64() {
        let values = vec![1.0, -2.5, 3.125, 0.0];
        let bytes = narrow(&values, NumericType::Float64);
        let back = widen(&bytes, NumericType::Float64).unwrap();
        assert_eq!(values, back);
    }

    #[test]
    fn widen_narrow_round_trip_f32() {
        let values = vec![1.0f64, -2.5, 3.125];
        let bytes = narrow(&values, NumericType::Float32);
        let back = widen(&bytes, NumericType::Float32).unwrap();
        assert_eq!(values, back);
    }

    #[test]
    fn widen_rejects_misaligned_length() {
        let bytes = vec![0u8; 7];
        assert!(widen(&bytes, NumericType::Float64).is_err());
    }
}
