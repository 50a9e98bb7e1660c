//! Codec runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into [`crate::DualCodec`].
//! The codec itself never reads environment variables; callers that want environment-driven
//! configuration hand the raw values to [`CodecConfig::from_env_values`].

use crate::constants::{DEFAULT_PASSPHRASE_LENGTH, DEFAULT_PRIVATE_KINDS};
use crate::{CodecError, CodecResult};
use anamnese_types::{NonEmptyText, MIN_PASSPHRASE_CHARS};
use std::collections::BTreeSet;

/// Codec configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecConfig {
    compress: bool,
    passphrase_length: usize,
    private_kinds: BTreeSet<NonEmptyText>,
}

impl CodecConfig {
    /// Create a new `CodecConfig`.
    ///
    /// `passphrase_length` is the length of generated passphrases and may not undercut the
    /// passphrase floor.
    pub fn new(
        compress: bool,
        passphrase_length: usize,
        private_kinds: BTreeSet<NonEmptyText>,
    ) -> CodecResult<Self> {
        if passphrase_length < MIN_PASSPHRASE_CHARS {
            return Err(CodecError::InvalidConfig(format!(
                "passphrase_length must be at least {MIN_PASSPHRASE_CHARS}"
            )));
        }

        Ok(Self {
            compress,
            passphrase_length,
            private_kinds,
        })
    }

    /// Build a configuration from optional raw values, typically read from
    /// `ANAMNESE_COMPRESS`, `ANAMNESE_PASSPHRASE_LENGTH` and `ANAMNESE_PRIVATE_KINDS`.
    ///
    /// `None` or blank values fall back to the defaults. Private kinds are comma separated.
    pub fn from_env_values(
        compress: Option<String>,
        passphrase_length: Option<String>,
        private_kinds: Option<String>,
    ) -> CodecResult<Self> {
        let defaults = Self::default();

        let compress = match non_blank(compress) {
            Some(v) => parse_bool(&v)?,
            None => defaults.compress,
        };

        let passphrase_length = match non_blank(passphrase_length) {
            Some(v) => v.parse::<usize>().map_err(|_| {
                CodecError::InvalidConfig(format!("passphrase_length is not a number: {v}"))
            })?,
            None => defaults.passphrase_length,
        };

        let private_kinds = match non_blank(private_kinds) {
            Some(v) => parse_kinds(&v)?,
            None => defaults.private_kinds,
        };

        Self::new(compress, passphrase_length, private_kinds)
    }

    pub fn compress(&self) -> bool {
        self.compress
    }

    pub fn passphrase_length(&self) -> usize {
        self.passphrase_length
    }

    pub fn private_kinds(&self) -> &BTreeSet<NonEmptyText> {
        &self.private_kinds
    }

    pub fn is_private_kind(&self, kind: &str) -> bool {
        self.private_kinds.iter().any(|k| k.as_str() == kind)
    }

    /// Returns a copy with compression switched on or off.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Returns a copy with `kinds` replacing the private kind set.
    pub fn with_private_kinds<I, S>(mut self, kinds: I) -> CodecResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.private_kinds = kinds
            .into_iter()
            .map(|k| {
                NonEmptyText::new(k)
                    .map_err(|_| CodecError::InvalidConfig("private kind cannot be empty".into()))
            })
            .collect::<CodecResult<_>>()?;
        Ok(self)
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            compress: true,
            passphrase_length: DEFAULT_PASSPHRASE_LENGTH,
            private_kinds: DEFAULT_PRIVATE_KINDS
                .iter()
                .filter_map(|k| NonEmptyText::new(k).ok())
                .collect(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> CodecResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CodecError::InvalidConfig(format!(
            "compress must be a boolean, got {other}"
        ))),
    }
}

fn parse_kinds(value: &str) -> CodecResult<BTreeSet<NonEmptyText>> {
    value
        .split(',')
        .filter(|k| !k.trim().is_empty())
        .map(|k| {
            NonEmptyText::new(k)
                .map_err(|_| CodecError::InvalidConfig("private kind cannot be empty".into()))
        })
        .collect()
}
