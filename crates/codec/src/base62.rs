//! Base62 text encoding of arbitrary byte strings.
//!
//! The input is read as one big-endian unsigned integer and rendered with
//! [`BASE62_ALPHABET`]. Leading zero bytes carry no numeric weight, so each one is written as a
//! literal `'0'` prefix character and restored as a zero byte on decode. A non-zero remainder
//! never starts with `'0'`, which keeps the prefix unambiguous.
//!
//! Record streams are routinely longer than any fixed-width integer, so conversion uses
//! schoolbook long division over the byte buffer.

use crate::constants::BASE62_ALPHABET;
use crate::{CodecError, CodecResult};

const ZERO: char = '0';

/// Encodes `bytes` as Base62.
///
/// An all-zero input of length `k` becomes `k` zero characters; an empty input becomes an
/// empty string.
pub fn bytes_to_base62(bytes: &[u8]) -> String {
    let leading_zeros = bytes.iter().take_while(|b| **b == 0).count();
    let mut number: Vec<u8> = bytes[leading_zeros..].to_vec();

    let mut digits = Vec::new();
    while !number.is_empty() {
        let mut quotient = Vec::with_capacity(number.len());
        let mut remainder: u32 = 0;
        for byte in &number {
            let acc = (remainder << 8) | u32::from(*byte);
            let q = (acc / 62) as u8;
            remainder = acc % 62;
            if !(quotient.is_empty() && q == 0) {
                quotient.push(q);
            }
        }
        digits.push(BASE62_ALPHABET[remainder as usize]);
        number = quotient;
    }

    let mut out = String::with_capacity(leading_zeros + digits.len());
    out.extend(std::iter::repeat(ZERO).take(leading_zeros));
    out.extend(digits.iter().rev().map(|d| char::from(*d)));
    out
}

/// Decodes a Base62 string produced by [`bytes_to_base62`].
pub fn base62_to_bytes(text: &str) -> CodecResult<Vec<u8>> {
    let leading_zeros = text.chars().take_while(|c| *c == ZERO).count();

    let mut number: Vec<u8> = Vec::new();
    for c in text.chars().skip(leading_zeros) {
        let mut carry = digit_value(c)?;
        for byte in number.iter_mut().rev() {
            let acc = u32::from(*byte) * 62 + carry;
            *byte = (acc & 0xff) as u8;
            carry = acc >> 8;
        }
        while carry > 0 {
            number.insert(0, (carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0u8; leading_zeros];
    out.extend_from_slice(&number);
    Ok(out)
}

fn digit_value(c: char) -> CodecResult<u32> {
    match c {
        '0'..='9' => Ok(c as u32 - '0' as u32),
        'A'..='Z' => Ok(c as u32 - 'A' as u32 + 10),
        'a'..='z' => Ok(c as u32 - 'a' as u32 + 36),
        other => Err(CodecError::InvalidBase62Char(other)),
    }
}
