//! Unsigned LEB128 varints for `u32` values.
//!
//! Seven data bits per byte, least significant group first, continuation bit (`0x80`) set on
//! every byte except the last. A `u32` needs at most five bytes.

use crate::{CodecError, CodecResult};

const MAX_VARINT_BYTES: usize = 5;

/// Appends the LEB128 encoding of `value` to `out`.
pub fn encode_into(mut value: u32, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Returns the LEB128 encoding of `value`.
pub fn encode(value: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VARINT_BYTES);
    encode_into(value, &mut out);
    out
}

/// Decodes one varint starting at `offset`.
///
/// Returns the value and the offset of the first byte after it.
pub fn decode(bytes: &[u8], offset: usize) -> CodecResult<(u32, usize)> {
    let mut value: u32 = 0;

    for i in 0..MAX_VARINT_BYTES {
        let pos = offset + i;
        let byte = *bytes
            .get(pos)
            .ok_or(CodecError::MalformedVarint { offset })?;
        let shift = 7 * i as u32;

        // The fifth byte only has room for the top four bits of a u32.
        if i == MAX_VARINT_BYTES - 1 && byte & 0xf0 != 0 {
            return Err(CodecError::VarintOverflow { offset });
        }

        value |= u32::from(byte & 0x7f) << shift;

        if byte & 0x80 == 0 {
            return Ok((value, pos + 1));
        }
    }

    Err(CodecError::VarintOverflow { offset })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boundary_values() {
        for (value, expected) in [
            (0u32, vec![0x00]),
            (127, vec![0x7f]),
            (128, vec![0x80, 0x01]),
            (300, vec![0xac, 0x02]),
            (u32::MAX, vec![0xff, 0xff, 0xff, 0xff, 0x0f]),
        ] {
            let encoded = encode(value);
            assert_eq!(encoded, expected, "encoding {value}");
            assert_eq!(decode(&encoded, 0).unwrap(), (value, encoded.len()));
        }
    }

    #[test]
    fn test_decode_at_offset() {
        let bytes = [0xaa, 0x80, 0x01, 0x05];
        assert_eq!(decode(&bytes, 1).unwrap(), (128, 3));
        assert_eq!(decode(&bytes, 3).unwrap(), (5, 4));
    }

    #[test]
    fn test_truncated_stream_is_malformed() {
        assert!(matches!(
            decode(&[0x80, 0x80], 0),
            Err(CodecError::MalformedVarint { offset: 0 })
        ));
        assert!(matches!(
            decode(&[], 0),
            Err(CodecError::MalformedVarint { .. })
        ));
        assert!(matches!(
            decode(&[0x01], 1),
            Err(CodecError::MalformedVarint { offset: 1 })
        ));
    }

    #[test]
    fn test_overlong_varint_overflows() {
        assert!(matches!(
            decode(&[0xff, 0xff, 0xff, 0xff, 0x80, 0x01], 0),
            Err(CodecError::VarintOverflow { .. })
        ));
    }

    #[test]
    fn test_value_above_u32_overflows() {
        // 2^32 would need bit 4 of the fifth byte.
        assert!(matches!(
            decode(&[0x80, 0x80, 0x80, 0x80, 0x10], 0),
            Err(CodecError::VarintOverflow { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_varint_round_trips(value in any::<u32>()) {
            let encoded = encode(value);
            prop_assert!(encoded.len() <= 5);
            prop_assert_eq!(decode(&encoded, 0).unwrap(), (value, encoded.len()));
        }
    }
}
