//! Splitting answers into a static (non-identifying) part and a private token list.
//!
//! Policy per answer:
//!
//! - `Select` is always static.
//! - `Multi` indices are always static. Non-blank free text becomes a private token under the
//!   synthetic id `<id>::__free`, referenced by a static `TextRef` record of the same id.
//! - `Number` is static unless `number` is a private kind.
//! - `Text` with kind `text` or a configured private kind becomes a private token.
//! - Any other text kind is rejected.
//!
//! Token ids are positions in the private list, assigned in the answer set's insertion order.
//! The list is never reordered or filtered once ids are handed out.

use crate::constants::{FREE_TEXT_SUFFIX, KIND_TEXT, MODE_MULTI_FREE_TEXT, MODE_NUMBER};
use crate::record::StaticAnswer;
use crate::{AnswerSet, CodecConfig, CodecError, CodecResult, RawAnswer};
use std::collections::BTreeMap;

/// What a private token holds.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TokenMode {
    /// Free text attached to the multi-select answer named by the token's owner id.
    MultiFreeText,
    /// Decimal rendering of a private number.
    Number,
    /// Text answer of the given kind (`text`, `pii`, `date`, ...).
    Text(String),
}

impl TokenMode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::MultiFreeText => MODE_MULTI_FREE_TEXT,
            Self::Number => MODE_NUMBER,
            Self::Text(kind) => kind,
        }
    }
}

impl From<String> for TokenMode {
    fn from(mode: String) -> Self {
        match mode.as_str() {
            MODE_MULTI_FREE_TEXT => Self::MultiFreeText,
            MODE_NUMBER => Self::Number,
            _ => Self::Text(mode),
        }
    }
}

impl From<TokenMode> for String {
    fn from(mode: TokenMode) -> Self {
        match mode {
            TokenMode::Text(kind) => kind,
            other => other.as_str().to_owned(),
        }
    }
}

/// One private value. Its position in [`PrivateObject::texts`] is its token id.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateToken {
    pub question_id: String,
    pub mode: TokenMode,
    pub text: String,
}

impl PrivateToken {
    /// The multi-select question this token's free text belongs to, if any.
    pub fn free_text_owner(&self) -> Option<&str> {
        match self.mode {
            TokenMode::MultiFreeText => self.question_id.strip_suffix(FREE_TEXT_SUFFIX),
            _ => None,
        }
    }
}

/// Everything that goes into the encrypted payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PrivateObject {
    pub texts: Vec<PrivateToken>,
}

impl PrivateObject {
    /// Looks up a token by the id stored in a `TextRef` record.
    pub fn token(&self, token_id: u32) -> Option<&PrivateToken> {
        self.texts.get(token_id as usize)
    }

    fn push(&mut self, question_id: String, mode: TokenMode, text: String) -> StaticAnswer {
        let token_id = self.texts.len() as u32;
        self.texts.push(PrivateToken {
            question_id,
            mode,
            text,
        });
        StaticAnswer::TextRef { token_id }
    }
}

/// Result of [`anonymize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anonymized {
    pub static_answers: BTreeMap<String, StaticAnswer>,
    pub private: PrivateObject,
}

/// Splits `answers` into static records and private tokens, using the private kinds of
/// `config`.
pub fn anonymize(answers: &AnswerSet, config: &CodecConfig) -> CodecResult<Anonymized> {
    let is_private = |kind: &str| config.is_private_kind(kind);

    let mut static_answers = BTreeMap::new();
    let mut private = PrivateObject::default();

    for (question_id, answer) in answers.iter() {
        if question_id.ends_with(FREE_TEXT_SUFFIX) {
            return Err(CodecError::ReservedQuestionId(question_id.to_owned()));
        }

        let record = match answer {
            RawAnswer::Select { index } => StaticAnswer::Select { index: *index },
            RawAnswer::Multi { indices, free_text } => {
                if let Some(text) = free_text.as_deref().filter(|t| !t.trim().is_empty()) {
                    let free_id = format!("{question_id}{FREE_TEXT_SUFFIX}");
                    let reference =
                        private.push(free_id.clone(), TokenMode::MultiFreeText, text.to_owned());
                    static_answers.insert(free_id, reference);
                }
                StaticAnswer::Multi {
                    indices: indices.clone(),
                }
            }
            RawAnswer::Number { value } if is_private(MODE_NUMBER) => private.push(
                question_id.to_owned(),
                TokenMode::Number,
                value.to_string(),
            ),
            RawAnswer::Number { value } => StaticAnswer::Number { value: *value },
            RawAnswer::Text { kind, text } if kind == KIND_TEXT || is_private(kind) => private
                .push(
                    question_id.to_owned(),
                    TokenMode::Text(kind.clone()),
                    text.clone(),
                ),
            RawAnswer::Text { kind, .. } => {
                return Err(CodecError::UnknownAnswerKind {
                    question_id: question_id.to_owned(),
                    kind: kind.clone(),
                })
            }
        };

        static_answers.insert(question_id.to_owned(), record);
    }

    tracing::debug!(
        static_records = static_answers.len(),
        private_tokens = private.texts.len(),
        "anonymised answers"
    );

    Ok(Anonymized {
        static_answers,
        private,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(list: &[&str]) -> CodecConfig {
        CodecConfig::default().with_private_kinds(list).unwrap()
    }

    fn default_kinds() -> CodecConfig {
        CodecConfig::default()
    }

    #[test]
    fn test_select_and_number_stay_static() {
        let answers: AnswerSet = [
            ("0002", RawAnswer::Select { index: 1 }),
            ("4001", RawAnswer::Number { value: 83 }),
        ]
        .into_iter()
        .collect();

        let result = anonymize(&answers, &default_kinds()).unwrap();
        assert!(result.private.texts.is_empty());
        assert_eq!(
            result.static_answers["0002"],
            StaticAnswer::Select { index: 1 }
        );
        assert_eq!(
            result.static_answers["4001"],
            StaticAnswer::Number { value: 83 }
        );
    }

    #[test]
    fn test_text_kinds_become_tokens_in_insertion_order() {
        let answers: AnswerSet = [
            ("z", RawAnswer::text("pii", "Mustermann")),
            ("a", RawAnswer::text("date", "1980-01-02")),
            ("m", RawAnswer::text("text", "Freitext")),
        ]
        .into_iter()
        .collect();

        let result = anonymize(&answers, &default_kinds()).unwrap();
        assert_eq!(
            result.static_answers["z"],
            StaticAnswer::TextRef { token_id: 0 }
        );
        assert_eq!(
            result.static_answers["a"],
            StaticAnswer::TextRef { token_id: 1 }
        );
        assert_eq!(
            result.static_answers["m"],
            StaticAnswer::TextRef { token_id: 2 }
        );
        assert_eq!(result.private.texts[0].text, "Mustermann");
        assert_eq!(result.private.texts[0].mode, TokenMode::Text("pii".into()));
        assert_eq!(result.private.texts[1].question_id, "a");
    }

    #[test]
    fn test_multi_free_text_gets_synthetic_token() {
        let answers: AnswerSet = [(
            "1005",
            RawAnswer::Multi {
                indices: vec![0, 2, 4],
                free_text: Some("strong chills".into()),
            },
        )]
        .into_iter()
        .collect();

        let result = anonymize(&answers, &default_kinds()).unwrap();
        assert_eq!(
            result.static_answers["1005"],
            StaticAnswer::Multi {
                indices: vec![0, 2, 4]
            }
        );
        assert_eq!(
            result.static_answers["1005::__free"],
            StaticAnswer::TextRef { token_id: 0 }
        );

        let token = &result.private.texts[0];
        assert_eq!(token.mode, TokenMode::MultiFreeText);
        assert_eq!(token.free_text_owner(), Some("1005"));
    }

    #[test]
    fn test_blank_free_text_is_dropped() {
        let answers: AnswerSet = [(
            "1005",
            RawAnswer::Multi {
                indices: vec![1],
                free_text: Some("   ".into()),
            },
        )]
        .into_iter()
        .collect();

        let result = anonymize(&answers, &default_kinds()).unwrap();
        assert_eq!(result.static_answers.len(), 1);
        assert!(result.private.texts.is_empty());
    }

    #[test]
    fn test_private_number() {
        let answers: AnswerSet = [("4001", RawAnswer::Number { value: 83 })]
            .into_iter()
            .collect();

        let result = anonymize(&answers, &kinds(&["text", "number"])).unwrap();
        assert_eq!(
            result.static_answers["4001"],
            StaticAnswer::TextRef { token_id: 0 }
        );
        assert_eq!(result.private.texts[0].mode, TokenMode::Number);
        assert_eq!(result.private.texts[0].text, "83");
    }

    #[test]
    fn test_text_kind_is_private_without_configuration() {
        let answers: AnswerSet = [("free", RawAnswer::text("text", "x"))]
            .into_iter()
            .collect();
        let result = anonymize(&answers, &kinds(&[])).unwrap();
        assert_eq!(result.private.texts.len(), 1);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let answers: AnswerSet = [("q", RawAnswer::text("signature", "x"))]
            .into_iter()
            .collect();
        let result = anonymize(&answers, &default_kinds());
        assert!(matches!(
            result,
            Err(CodecError::UnknownAnswerKind { ref question_id, ref kind })
                if question_id == "q" && kind == "signature"
        ));
    }

    #[test]
    fn test_reserved_suffix_is_rejected() {
        let answers: AnswerSet = [("1005::__free", RawAnswer::text("text", "x"))]
            .into_iter()
            .collect();
        assert!(matches!(
            anonymize(&answers, &default_kinds()),
            Err(CodecError::ReservedQuestionId(_))
        ));
    }

    #[test]
    fn test_token_json_shape() {
        let token = PrivateToken {
            question_id: "1005::__free".into(),
            mode: TokenMode::MultiFreeText,
            text: "x".into(),
        };
        assert_eq!(
            serde_json::to_value(&token).unwrap(),
            serde_json::json!({"questionId": "1005::__free", "mode": "multiFreeText", "text": "x"})
        );
        let back: PrivateToken = serde_json::from_value(serde_json::to_value(&token).unwrap()).unwrap();
        assert_eq!(back, token);
    }
}
