//! Constants used throughout the codec crate.
//!
//! Everything in here is part of a wire format or a security floor. Changing any value breaks
//! compatibility with codes and payloads already handed out.

/// Base62 alphabet: digits, then upper case, then lower case.
pub const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Upper bound on the inflated static record stream, in bytes.
pub const MAX_STATIC_STREAM_BYTES: usize = 1 << 20;

/// Version tag leading every private payload.
pub const PAYLOAD_VERSION: &str = "v1";

/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// AES-GCM nonce length in bytes (96 bits).
pub const IV_LEN: usize = 12;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// Random bytes behind a Base62-rendered passphrase.
pub const PASSPHRASE_RANDOM_BYTES: usize = 32;

/// Smallest `char_len` accepted for human-entry passphrases.
pub const MIN_GENERATED_CHARS: usize = 10;

/// Default length of a generated passphrase.
pub const DEFAULT_PASSPHRASE_LENGTH: usize = 12;

/// Suffix of the synthetic question id carrying a multi-select's free text.
pub const FREE_TEXT_SUFFIX: &str = "::__free";

/// Token mode for multi-select free text.
pub const MODE_MULTI_FREE_TEXT: &str = "multiFreeText";

/// Token mode (and private kind) for numbers.
pub const MODE_NUMBER: &str = "number";

/// Kind that is always private.
pub const KIND_TEXT: &str = "text";

/// Private kinds used when nothing else is configured.
pub const DEFAULT_PRIVATE_KINDS: [&str; 3] = ["text", "pii", "date"];
