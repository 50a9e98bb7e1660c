//! # Anamnese Codec
//!
//! Dual encoding of intake questionnaire answers:
//!
//! - a short **static code** (`[0-9A-Za-z]+`) holding only non-identifying answers: selected
//!   options, multi-select indices and, unless configured otherwise, numbers
//! - an encrypted **private payload** holding free text, PII, dates and anything else that
//!   could identify or profile the patient
//!
//! Private answers are replaced in the static code by references into the private token list,
//! so the static code can be shown, stored or logged without the passphrase.
//!
//! ## Pipeline
//!
//! ```text
//! answers ─ anonymize ─┬─ static records ─ record stream ─ deflate ─ Base62 ─> static code
//!                      └─ private tokens ─ JSON ─ AES-256-GCM (PBKDF2 key) ─> private payload
//! ```
//!
//! The codec is schema-agnostic: it works on question id -> answer maps and knows nothing about
//! any particular questionnaire.
//!
//! **No I/O**: reading answers, storing codes and prompting for passphrases belong to callers
//! such as `anamnese-cli`.
//!
//! ## Example
//!
//! ```no_run
//! use anamnese_codec::{AnswerSet, CodecConfig, DualCodec, RawAnswer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut answers = AnswerSet::new();
//! answers.insert("0002", RawAnswer::Select { index: 1 });
//! answers.insert("3003", RawAnswer::text("pii", "name@example.com"));
//!
//! let codec = DualCodec::new(CodecConfig::default());
//! let encoded = codec.encode_dual(&answers, None)?;
//! let decoded = codec.decode_dual(
//!     &encoded.static_code,
//!     &encoded.private_payload,
//!     &encoded.passphrase,
//! )?;
//! assert_eq!(decoded.answers, answers);
//! # Ok(())
//! # }
//! ```

mod answer;
pub mod anonymize;
pub mod base62;
mod codec;
pub mod compress;
mod config;
pub mod constants;
pub mod envelope;
mod error;
pub mod passphrase;
pub mod record;
pub mod varint;

pub use answer::{AnswerSet, RawAnswer};
pub use anonymize::{PrivateObject, PrivateToken, TokenMode};
pub use codec::{DecodedDual, DualCodec, EncodedOutput, StaticView};
pub use compress::{Deflater, IdentityDeflater, RawDeflate};
pub use config::CodecConfig;
pub use envelope::{AeadCipher, Aes256GcmCipher, EnvelopeCrypto, OsRandom, RandomSource};
pub use error::{CodecError, CodecResult};
pub use record::{AnswerType, StaticAnswer};

pub use anamnese_types::{NonEmptyText, Passphrase};
