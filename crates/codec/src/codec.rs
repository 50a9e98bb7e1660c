//! Dual codec facade.
//!
//! [`DualCodec::encode_dual`] turns an answer set into a public `static_code` and an encrypted
//! `private_payload`. [`DualCodec::decode_dual`] reverses both and merges them back into the
//! original answers. [`DualCodec::decode_static`] and [`DualCodec::decode_private`] can be used on
//! their own, e.g. to show the non-sensitive summary without asking for the passphrase.
//!
//! Encode and decode must agree on [`CodecConfig::compress`]. The static code carries no format
//! marker; a mismatch surfaces as a decompression or record parsing error.

use crate::anonymize::{anonymize, PrivateObject, TokenMode};
use crate::base62::{base62_to_bytes, bytes_to_base62};
use crate::compress::{Deflater, RawDeflate};
use crate::constants::FREE_TEXT_SUFFIX;
use crate::envelope::{Aes256GcmCipher, AeadCipher, EnvelopeCrypto, OsRandom, RandomSource};
use crate::passphrase::generate_chars;
use crate::record::{decode_records, encode_records, StaticAnswer};
use crate::{AnswerSet, CodecConfig, CodecError, CodecResult, RawAnswer};
use anamnese_types::Passphrase;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Output of [`DualCodec::encode_dual`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedOutput {
    /// Non-identifying answers, `[0-9A-Za-z]+`.
    pub static_code: String,
    /// `v1.<salt>.<iv>.<ciphertext>`.
    pub private_payload: String,
    /// The passphrase that opens `private_payload`, supplied or generated.
    pub passphrase: Passphrase,
}

/// Static answers as decoded from a static code. Private answers appear as
/// [`StaticAnswer::TextRef`] only.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StaticView {
    pub answers: BTreeMap<String, StaticAnswer>,
}

/// Output of [`DualCodec::decode_dual`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DecodedDual {
    pub answers: AnswerSet,
    pub private: PrivateObject,
}

/// Encodes and decodes answer sets.
///
/// Holds only configuration and stateless providers, so one instance can serve any number of
/// calls from any thread.
#[derive(Debug, Clone)]
pub struct DualCodec {
    config: CodecConfig,
    deflater: Arc<dyn Deflater>,
    random: Arc<dyn RandomSource>,
    envelope: EnvelopeCrypto,
}

impl DualCodec {
    /// Codec with raw DEFLATE, OS randomness and AES-256-GCM.
    pub fn new(config: CodecConfig) -> Self {
        Self::with_providers(
            config,
            Arc::new(RawDeflate),
            Arc::new(OsRandom),
            Arc::new(Aes256GcmCipher),
        )
    }

    /// Codec with explicitly supplied providers.
    pub fn with_providers(
        config: CodecConfig,
        deflater: Arc<dyn Deflater>,
        random: Arc<dyn RandomSource>,
        cipher: Arc<dyn AeadCipher>,
    ) -> Self {
        if config.compress() {
            tracing::debug!(deflater = ?deflater, "static stream compression enabled");
        } else {
            tracing::warn!("static stream compression disabled; decoders must match");
        }

        let envelope = EnvelopeCrypto::new(Arc::clone(&random), cipher);
        Self {
            config,
            deflater,
            random,
            envelope,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Splits `answers`, encodes the static side and encrypts the private side.
    ///
    /// Without a `passphrase` one of `passphrase_length` characters is generated.
    pub fn encode_dual(
        &self,
        answers: &AnswerSet,
        passphrase: Option<Passphrase>,
    ) -> CodecResult<EncodedOutput> {
        if answers.is_empty() {
            return Err(CodecError::EmptyAnswers);
        }

        let passphrase = match passphrase {
            Some(p) => p,
            None => generate_chars(self.random.as_ref(), self.config.passphrase_length())?,
        };

        let split = anonymize(answers, &self.config)?;

        let raw = encode_records(&split.static_answers);
        let static_bytes = if self.config.compress() {
            self.deflater.compress(&raw)?
        } else {
            raw
        };
        let static_code = bytes_to_base62(&static_bytes);
        let private_payload = self.envelope.encrypt(&split.private, &passphrase)?;

        tracing::debug!(
            answers = answers.len(),
            static_code_len = static_code.len(),
            private_payload_len = private_payload.len(),
            "encoded answers"
        );

        Ok(EncodedOutput {
            static_code,
            private_payload,
            passphrase,
        })
    }

    /// Decodes both halves and merges private texts back into the answers.
    pub fn decode_dual(
        &self,
        static_code: &str,
        private_payload: &str,
        passphrase: &Passphrase,
    ) -> CodecResult<DecodedDual> {
        require_non_empty(static_code, "static code")?;
        require_non_empty(private_payload, "private payload")?;

        let view = self.decode_static(static_code)?;
        let private = self.decode_private(private_payload, passphrase)?;
        let answers = rehydrate(view.answers, &private);

        Ok(DecodedDual { answers, private })
    }

    /// Decodes the non-sensitive half. No passphrase required.
    pub fn decode_static(&self, static_code: &str) -> CodecResult<StaticView> {
        require_non_empty(static_code, "static code")?;

        let bytes = base62_to_bytes(static_code)?;
        let raw = if self.config.compress() {
            self.deflater.decompress(&bytes)?
        } else {
            bytes
        };
        let answers = decode_records(&raw)?;

        tracing::debug!(records = answers.len(), "decoded static code");
        Ok(StaticView { answers })
    }

    /// Decrypts the private half.
    pub fn decode_private(
        &self,
        private_payload: &str,
        passphrase: &Passphrase,
    ) -> CodecResult<PrivateObject> {
        require_non_empty(private_payload, "private payload")?;
        self.envelope.decrypt(private_payload, passphrase)
    }
}

impl Default for DualCodec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

fn require_non_empty(value: &str, what: &'static str) -> CodecResult<()> {
    if value.is_empty() {
        return Err(CodecError::MissingInput(what));
    }
    Ok(())
}

/// Resolves `TextRef` records against the private tokens and reattaches multi-select free text.
///
/// A reference resolves only when the token's own question id matches the record's, so a
/// payload paired with the wrong static code cannot move text between questions. Synthetic
/// free-text records never appear in the result.
fn rehydrate(statics: BTreeMap<String, StaticAnswer>, private: &PrivateObject) -> AnswerSet {
    let mut answers = AnswerSet::new();
    let mut attachments = Vec::new();

    for (question_id, answer) in statics {
        let is_synthetic = question_id.ends_with(FREE_TEXT_SUFFIX);

        let token_id = match answer {
            StaticAnswer::TextRef { token_id } => token_id,
            _ if is_synthetic => continue,
            StaticAnswer::Select { index } => {
                answers.insert(question_id, RawAnswer::Select { index });
                continue;
            }
            StaticAnswer::Multi { indices } => {
                answers.insert(
                    question_id,
                    RawAnswer::Multi {
                        indices,
                        free_text: None,
                    },
                );
                continue;
            }
            StaticAnswer::Number { value } => {
                answers.insert(question_id, RawAnswer::Number { value });
                continue;
            }
        };

        let token = private
            .token(token_id)
            .filter(|t| t.question_id == question_id);

        let Some(token) = token else {
            tracing::warn!(%question_id, token_id, "unresolved text reference");
            if !is_synthetic {
                answers.insert(question_id, RawAnswer::text("text", ""));
            }
            continue;
        };

        if let Some(owner) = token.free_text_owner() {
            attachments.push((owner.to_owned(), token.text.clone()));
            continue;
        }
        if is_synthetic {
            continue;
        }

        let answer = match &token.mode {
            TokenMode::Number => match token.text.parse::<u32>() {
                Ok(value) => RawAnswer::Number { value },
                Err(_) => RawAnswer::text(token.mode.as_str(), token.text.clone()),
            },
            mode => RawAnswer::text(mode.as_str(), token.text.clone()),
        };
        answers.insert(question_id, answer);
    }

    for (owner, text) in attachments {
        match answers.get(&owner) {
            Some(RawAnswer::Multi { indices, .. }) => {
                let indices = indices.clone();
                answers.insert(
                    owner,
                    RawAnswer::Multi {
                        indices,
                        free_text: Some(text),
                    },
                );
            }
            _ => tracing::warn!(question_id = %owner, "free text without multi-select answer"),
        }
    }

    answers
}
