//! Validated text types shared across the anamnese crates.

/// Minimum number of characters a passphrase must contain.
pub const MIN_PASSPHRASE_CHARS: usize = 12;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The passphrase is shorter than [`MIN_PASSPHRASE_CHARS`]
    #[error("Passphrase must be at least {min} characters (got {actual})")]
    PassphraseTooShort { min: usize, actual: usize },
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A passphrase of at least [`MIN_PASSPHRASE_CHARS`] characters.
///
/// Unlike [`NonEmptyText`] the input is kept verbatim: surrounding whitespace is part of the
/// secret. Length is counted in Unicode scalar values.
///
/// `Debug` is redacted so a passphrase cannot end up in log output by accident. Use
/// [`Passphrase::expose`] where the raw value is genuinely needed.
#[derive(Clone, PartialEq, Eq)]
pub struct Passphrase(String);

impl Passphrase {
    /// Creates a new `Passphrase`, rejecting inputs shorter than [`MIN_PASSPHRASE_CHARS`].
    pub fn new(input: impl Into<String>) -> Result<Self, TextError> {
        let input = input.into();
        let actual = input.chars().count();
        if actual < MIN_PASSPHRASE_CHARS {
            return Err(TextError::PassphraseTooShort {
                min: MIN_PASSPHRASE_CHARS,
                actual,
            });
        }
        Ok(Self(input))
    }

    /// Returns the raw passphrase.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Number of characters in the passphrase.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}

impl std::str::FromStr for Passphrase {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Passphrase::new(s)
    }
}

impl serde::Serialize for Passphrase {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Passphrase {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Passphrase::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims() {
        let text = NonEmptyText::new("  pii  ").unwrap();
        assert_eq!(text.as_str(), "pii");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn test_passphrase_minimum_length() {
        assert!(Passphrase::new("abcdefghijkl").is_ok());
        assert_eq!(
            Passphrase::new("abcdefghijk"),
            Err(TextError::PassphraseTooShort {
                min: 12,
                actual: 11
            })
        );
    }

    #[test]
    fn test_passphrase_counts_characters_not_bytes() {
        // 12 characters, 24 bytes
        let p = Passphrase::new("ääääääääääää").unwrap();
        assert_eq!(p.char_len(), 12);
        assert!(Passphrase::new("äääääääääää").is_err());
    }

    #[test]
    fn test_passphrase_keeps_whitespace() {
        let p = Passphrase::new("  correct horse  ").unwrap();
        assert_eq!(p.expose(), "  correct horse  ");
    }

    #[test]
    fn test_passphrase_debug_is_redacted() {
        let p = Passphrase::new("super-secret-value").unwrap();
        let rendered = format!("{:?}", p);
        assert!(!rendered.contains("super-secret-value"));
    }

    #[test]
    fn test_passphrase_deserialize_validates() {
        let ok: Result<Passphrase, _> = serde_json::from_str("\"0123456789AB\"");
        assert!(ok.is_ok());
        let short: Result<Passphrase, _> = serde_json::from_str("\"short\"");
        assert!(short.is_err());
    }
}
