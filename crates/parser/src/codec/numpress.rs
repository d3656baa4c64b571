//! MS-Numpress predictive compression: linear, positive-integer (PIC), and
//! short-logged-float (SLOF) schemes (§4.A).
//!
//! Matches the published MS-Numpress wire format rather than an invented
//! one: `encodeFixedPoint` writes the scale factor as an 8-byte big-endian
//! double with no trailing element count, and `encodeInt`/`decodeInt` pack a
//! value as a leading half-byte count (0-8) followed by that many data
//! nibbles, least significant nibble first. The element count is never
//! embedded on the wire; decoders take it from the binary data array's
//! declared length and otherwise consume nibbles until the input is
//! exhausted.

use crate::error::{Error, Result};

const DEFAULT_LINEAR_FIXED_POINT: f64 = 1.0e5;
const DEFAULT_PIC_FIXED_POINT: f64 = 1.0;

fn zigzag(x: i64) -> u32 {
    let x = x as i32;
    ((x << 1) ^ (x >> 31)) as u32
}

fn unzigzag(u: u32) -> i64 {
    (((u >> 1) as i32) ^ -((u & 1) as i32)) as i64
}

/// Append `x` as a leading half-byte count (0-8) followed by that many data
/// nibbles, least significant nibble first (reference `encodeInt`).
fn encode_int(x: u32, out: &mut Vec<u8>) {
    if x == 0 {
        out.push(0);
        return;
    }
    let mut nibbles = [0u8; 8];
    let mut n = 0usize;
    let mut v = x;
    while v != 0 {
        nibbles[n] = (v & 0xF) as u8;
        v >>= 4;
        n += 1;
    }
    out.push(n as u8);
    out.extend_from_slice(&nibbles[..n]);
}

/// Inverse of [`encode_int`]; returns the decoded value and the number of
/// nibbles consumed (the leading count nibble plus its data nibbles).
fn decode_int(nibbles: &[u8]) -> Option<(u32, usize)> {
    let count = *nibbles.first()? as usize;
    if count > 8 || nibbles.len() < 1 + count {
        return None;
    }
    let mut value: u32 = 0;
    for i in (0..count).rev() {
        value = (value << 4) | nibbles[1 + i] as u32;
    }
    Some((value, 1 + count))
}

fn pack_nibbles(nibbles: &[u8], out: &mut Vec<u8>) {
    for pair in nibbles.chunks(2) {
        if pair.len() == 2 {
            out.push((pair[0] & 0xF) | ((pair[1] & 0xF) << 4));
        } else {
            out.push(pair[0] & 0xF);
        }
    }
}

fn unpack_nibbles(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(b & 0xF);
        out.push((b >> 4) & 0xF);
    }
    out
}

/// Write the fixed-point scale factor as an 8-byte big-endian double
/// (reference `encodeFixedPoint`).
fn encode_fixed_point(fixed_point: f64, out: &mut Vec<u8>) {
    out.extend_from_slice(&fixed_point.to_be_bytes());
}

fn decode_fixed_point(bytes: &[u8], codec: &str) -> Result<f64> {
    if bytes.len() < 8 {
        return Err(Error::CodecError(format!(
            "numpress {codec}: truncated header"
        )));
    }
    let fixed_point = f64::from_be_bytes(bytes[0..8].try_into().unwrap());
    if fixed_point == 0.0 {
        return Err(Error::CodecError(format!(
            "numpress {codec}: zero fixed point"
        )));
    }
    Ok(fixed_point)
}

/// Encode with the fixed-point second-order linear predictor; the first two
/// values are stored verbatim as big-endian `i32` seeds (§4.A).
pub fn encode_linear(data: &[f64]) -> Vec<u8> {
    encode_linear_with_scale(data, DEFAULT_LINEAR_FIXED_POINT)
}

pub fn encode_linear_with_scale(data: &[f64], fixed_point: f64) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + data.len() * 2);
    encode_fixed_point(fixed_point, &mut out);

    if data.is_empty() {
        return out;
    }

    let ints: Vec<i64> = data
        .iter()
        .map(|&v| (v * fixed_point).round() as i64)
        .collect();
    out.extend_from_slice(&(ints[0] as i32).to_be_bytes());
    if ints.len() == 1 {
        return out;
    }
    out.extend_from_slice(&(ints[1] as i32).to_be_bytes());

    let mut nibbles = Vec::new();
    for i in 2..ints.len() {
        let predicted = 2 * ints[i - 1] - ints[i - 2];
        encode_int(zigzag(ints[i] - predicted), &mut nibbles);
    }
    pack_nibbles(&nibbles, &mut out);
    out
}

/// Decode a linear-predicted stream. `count`, when known (the binary data
/// array's declared length), bounds how many residuals are unpacked; when
/// `None` the decoder consumes nibbles until the input is exhausted.
pub fn decode_linear(bytes: &[u8], count: Option<usize>) -> Result<Vec<f64>> {
    let fixed_point = decode_fixed_point(bytes, "linear")?;
    let pos = 8;

    if count == Some(0) || bytes.len() == pos {
        return Ok(Vec::new());
    }

    if bytes.len() < pos + 4 {
        return Err(Error::CodecError("numpress linear: truncated seed".into()));
    }
    let i0 = i32::from_be_bytes(bytes[pos..pos + 4].try_into().unwrap()) as i64;
    let pos = pos + 4;
    let mut ints = vec![i0];

    if count == Some(1) || bytes.len() == pos {
        return Ok(ints.into_iter().map(|i| i as f64 / fixed_point).collect());
    }

    if bytes.len() < pos + 4 {
        return Err(Error::CodecError("numpress linear: truncated seed".into()));
    }
    let i1 = i32::from_be_bytes(bytes[pos..pos + 4].try_into().unwrap()) as i64;
    let pos = pos + 4;
    ints.push(i1);

    let nibbles = unpack_nibbles(&bytes[pos..]);
    let mut ni = 0usize;
    loop {
        match count {
            Some(target) if ints.len() >= target => break,
            None if ni >= nibbles.len() => break,
            _ => {}
        }
        let Some((u, consumed)) = decode_int(&nibbles[ni..]) else {
            if count.is_some() {
                return Err(Error::CodecError(
                    "numpress linear: truncated residual".into(),
                ));
            }
            break;
        };
        ni += consumed;
        let n = ints.len();
        let predicted = 2 * ints[n - 1] - ints[n - 2];
        ints.push(predicted + unzigzag(u));
    }

    Ok(ints.into_iter().map(|i| i as f64 / fixed_point).collect())
}

/// Encode the positive-integer scheme: no prediction, each rounded value is
/// packed directly as an unsigned variable-length nibble stream (§4.A).
pub fn encode_pic(data: &[f64]) -> Result<Vec<u8>> {
    encode_pic_with_scale(data, DEFAULT_PIC_FIXED_POINT)
}

pub fn encode_pic_with_scale(data: &[f64], fixed_point: f64) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(8 + data.len());
    encode_fixed_point(fixed_point, &mut out);

    let mut nibbles = Vec::new();
    for &v in data {
        if v < 0.0 {
            return Err(Error::CodecError(
                "numpress pic: negative value outside the integer domain".into(),
            ));
        }
        let u = (v * fixed_point).round() as u64;
        if u > u32::MAX as u64 {
            return Err(Error::CodecError(
                "numpress pic: value exceeds the 32-bit integer domain".into(),
            ));
        }
        encode_int(u as u32, &mut nibbles);
    }
    pack_nibbles(&nibbles, &mut out);
    Ok(out)
}

/// Decode a positive-integer stream; see [`decode_linear`] for the meaning
/// of `count`.
pub fn decode_pic(bytes: &[u8], count: Option<usize>) -> Result<Vec<f64>> {
    let fixed_point = decode_fixed_point(bytes, "pic")?;
    let nibbles = unpack_nibbles(&bytes[8..]);
    let mut out = Vec::new();
    let mut ni = 0usize;
    loop {
        match count {
            Some(target) if out.len() >= target => break,
            None if ni >= nibbles.len() => break,
            _ => {}
        }
        let Some((u, consumed)) = decode_int(&nibbles[ni..]) else {
            if count.is_some() {
                return Err(Error::CodecError("numpress pic: truncated value".into()));
            }
            break;
        };
        ni += consumed;
        out.push(u as f64 / fixed_point);
    }
    Ok(out)
}

/// Encode the short-logged-float scheme: scale, take the natural log, and
/// quantize to an unsigned 16-bit integer (§4.A).
pub fn encode_slof(data: &[f64]) -> Result<Vec<u8>> {
    let max = data.iter().cloned().fold(0.0_f64, f64::max);
    let fixed_point = if max > 0.0 {
        65_534.0 / (max + 1.0).ln()
    } else {
        1.0
    };
    encode_slof_with_scale(data, fixed_point)
}

pub fn encode_slof_with_scale(data: &[f64], fixed_point: f64) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(8 + data.len() * 2);
    encode_fixed_point(fixed_point, &mut out);

    for &v in data {
        if v < 0.0 {
            return Err(Error::CodecError(
                "numpress slof: negative value outside the positive domain".into(),
            ));
        }
        let q = ((v + 1.0).ln() * fixed_point).round();
        let q = q.clamp(0.0, u16::MAX as f64) as u16;
        out.extend_from_slice(&q.to_be_bytes());
    }
    Ok(out)
}

/// Decode a short-logged-float stream; `count`, when known, is used only to
/// validate the payload length (each value is a fixed 2 bytes so there is no
/// nibble-exhaustion ambiguity to resolve).
pub fn decode_slof(bytes: &[u8], count: Option<usize>) -> Result<Vec<f64>> {
    let fixed_point = decode_fixed_point(bytes, "slof")?;
    let body = &bytes[8..];
    let expected_len = count.map(|c| c * 2).unwrap_or(body.len());
    if body.len() < expected_len {
        return Err(Error::CodecError("numpress slof: truncated payload".into()));
    }
    Ok(body[..expected_len]
        .chunks_exact(2)
        .map(|c| {
            let q = u16::from_be_bytes(c.try_into().unwrap());
            (q as f64 / fixed_point).exp() - 1.0
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_round_trip_within_tolerance() {
        let data: Vec<f64> = (0..2000).map(|i| 400.0 + i as f64 * 0.013).collect();
        let encoded = encode_linear(&data);
        let decoded = decode_linear(&encoded, Some(data.len())).unwrap();
        assert_eq!(decoded.len(), data.len());
        for (a, b) in data.iter().zip(decoded.iter()) {
            let rel = (a - b).abs() / a.abs().max(1.0);
            assert!(rel < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn linear_round_trip_without_external_count() {
        let data: Vec<f64> = (0..500).map(|i| 100.0 + i as f64 * 0.2).collect();
        let encoded = encode_linear(&data);
        let decoded = decode_linear(&encoded, None).unwrap();
        assert_eq!(decoded.len(), data.len());
    }

    #[test]
    fn linear_handles_short_arrays() {
        assert_eq!(
            decode_linear(&encode_linear(&[]), Some(0)).unwrap(),
            Vec::<f64>::new()
        );
        assert_eq!(
            decode_linear(&encode_linear(&[42.0]), Some(1)).unwrap(),
            vec![42.0]
        );
        assert_eq!(
            decode_linear(&encode_linear(&[1.0, 2.0]), Some(2)).unwrap(),
            vec![1.0, 2.0]
        );
    }

    #[test]
    fn pic_round_trip_bit_exact_over_integer_domain() {
        let data: Vec<f64> = (0..500).map(|i| (i * 37 % 4096) as f64).collect();
        let encoded = encode_pic(&data).unwrap();
        let decoded = decode_pic(&encoded, Some(data.len())).unwrap();
        assert_eq!(data, decoded);
    }

    #[test]
    fn slof_round_trip_within_tolerance() {
        let data: Vec<f64> = (1..2000).map(|i| i as f64 * 53.7).collect();
        let encoded = encode_slof(&data).unwrap();
        let decoded = decode_slof(&encoded, Some(data.len())).unwrap();
        for (a, b) in data.iter().zip(decoded.iter()) {
            let rel = (a - b).abs() / a.abs().max(1.0);
            assert!(rel < 5e-4, "{a} vs {b}");
        }
    }

    #[test]
    fn pic_rejects_negative_values() {
        assert!(encode_pic(&[-1.0]).is_err());
    }

    #[test]
    fn encode_int_round_trips_the_full_nibble_range() {
        for x in [0u32, 1, 15, 16, 255, 65_535, 0xABCD_EF01] {
            let mut out = Vec::new();
            encode_int(x, &mut out);
            let (decoded, consumed) = decode_int(&out).unwrap();
            assert_eq!(decoded, x);
            assert_eq!(consumed, out.len());
        }
    }

    #[test]
    fn header_has_no_embedded_element_count() {
        let encoded = encode_linear_with_scale(&[1.0, 2.0, 3.0], 1.0e5);
        // 8-byte fixed point + two 4-byte seeds + >=0 nibble bytes, never a
        // separate u32 count field.
        assert_eq!(
            f64::from_be_bytes(encoded[0..8].try_into().unwrap()),
            1.0e5
        );
    }
}
