//! Passphrase generation.
//!
//! Two flavours:
//! - [`generate_base62`]: Base62 rendering of 32 random bytes (about 43 characters). Suitable
//!   when the passphrase is stored or transmitted by machine.
//! - [`generate_chars`]: `char_len` random bytes each reduced `mod 62` into the alphabet. Short
//!   enough to type, at the cost of a small bias towards the first eight symbols.

use crate::base62::bytes_to_base62;
use crate::constants::{BASE62_ALPHABET, MIN_GENERATED_CHARS, PASSPHRASE_RANDOM_BYTES};
use crate::envelope::RandomSource;
use crate::{CodecError, CodecResult};
use anamnese_types::Passphrase;

/// Base62 rendering of [`PASSPHRASE_RANDOM_BYTES`] random bytes.
pub fn generate_base62(random: &dyn RandomSource) -> CodecResult<Passphrase> {
    let mut bytes = [0u8; PASSPHRASE_RANDOM_BYTES];
    random.fill(&mut bytes)?;
    Ok(Passphrase::new(bytes_to_base62(&bytes))?)
}

/// `char_len` alphabet symbols for human entry.
///
/// `char_len` must be at least [`MIN_GENERATED_CHARS`]; the result must still satisfy the
/// passphrase floor.
pub fn generate_chars(random: &dyn RandomSource, char_len: usize) -> CodecResult<Passphrase> {
    if char_len < MIN_GENERATED_CHARS {
        return Err(CodecError::InvalidConfig(format!(
            "generated passphrase length must be at least {MIN_GENERATED_CHARS}"
        )));
    }

    let mut bytes = vec![0u8; char_len];
    random.fill(&mut bytes)?;
    let text: String = bytes
        .iter()
        .map(|b| char::from(BASE62_ALPHABET[usize::from(*b) % BASE62_ALPHABET.len()]))
        .collect();
    Ok(Passphrase::new(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::OsRandom;

    #[derive(Debug)]
    struct ConstRandom(u8);

    impl RandomSource for ConstRandom {
        fn fill(&self, buf: &mut [u8]) -> CodecResult<()> {
            buf.fill(self.0);
            Ok(())
        }
    }

    #[test]
    fn test_generate_chars_maps_mod_62() {
        // 200 % 62 == 14 -> 'E'
        let p = generate_chars(&ConstRandom(200), 12).unwrap();
        assert_eq!(p.expose(), "EEEEEEEEEEEE");
    }

    #[test]
    fn test_generate_chars_length_and_alphabet() {
        let p = generate_chars(&OsRandom, 16).unwrap();
        assert_eq!(p.char_len(), 16);
        assert!(p.expose().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_chars_rejects_tiny_length() {
        assert!(matches!(
            generate_chars(&OsRandom, 9),
            Err(CodecError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_generate_chars_below_floor_is_rejected() {
        // Allowed by the generator but not by the passphrase floor.
        assert!(matches!(
            generate_chars(&OsRandom, 10),
            Err(CodecError::PassphraseTooShort(_))
        ));
    }

    #[test]
    fn test_generate_base62() {
        let p = generate_base62(&ConstRandom(0xff)).unwrap();
        assert!(p.char_len() >= 42);
        assert!(p.expose().chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
