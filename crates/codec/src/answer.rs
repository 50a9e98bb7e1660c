//! Questionnaire answers as supplied by callers.
//!
//! Answers are tagged by `kind` in their JSON form:
//!
//! ```json
//! {
//!   "0002": { "kind": "select", "index": 1 },
//!   "1005": { "kind": "multi", "indices": [0, 2, 4], "freeText": "strong chills" },
//!   "3003": { "kind": "pii", "text": "a@b.com" },
//!   "4001": { "kind": "number", "value": 83 }
//! }
//! ```
//!
//! Any kind other than `select`, `multi` and `number` is a text kind. Whether a given text kind
//! is accepted is decided by the anonymisation policy, not here. A text answer without `text`
//! takes its `value` instead, rendered as a string (`{"kind": "date", "value": "1980-01-02"}`).

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use std::fmt;

/// A single answer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "WireAnswer", into = "WireAnswer")]
pub enum RawAnswer {
    Select {
        index: u32,
    },
    Multi {
        indices: Vec<u32>,
        free_text: Option<String>,
    },
    Number {
        value: u32,
    },
    /// Free text, PII, dates and any other caller-defined text kind.
    Text {
        kind: String,
        text: String,
    },
}

impl RawAnswer {
    /// Convenience constructor for text answers.
    pub fn text(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Text {
            kind: kind.into(),
            text: text.into(),
        }
    }

    /// The `kind` tag this answer carries in JSON.
    pub fn kind(&self) -> &str {
        match self {
            Self::Select { .. } => "select",
            Self::Multi { .. } => "multi",
            Self::Number { .. } => "number",
            Self::Text { kind, .. } => kind,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAnswer {
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    indices: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    free_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<WireValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// `value` may be a JSON number or a string.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum WireValue {
    Number(u32),
    Text(String),
}

impl WireValue {
    fn into_number(self) -> Result<u32, String> {
        match self {
            Self::Number(value) => Ok(value),
            Self::Text(text) => text.trim().parse().map_err(|_| {
                format!("number answer `value` is not a non-negative integer: {text:?}")
            }),
        }
    }

    fn into_text(self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(text) => text,
        }
    }
}

impl TryFrom<WireAnswer> for RawAnswer {
    type Error = String;

    fn try_from(wire: WireAnswer) -> Result<Self, Self::Error> {
        match wire.kind.as_str() {
            "select" => wire
                .index
                .map(|index| Self::Select { index })
                .ok_or_else(|| "select answer requires `index`".to_string()),
            "multi" => Ok(Self::Multi {
                indices: wire.indices.unwrap_or_default(),
                free_text: wire.free_text,
            }),
            "number" => {
                let value = wire
                    .value
                    .ok_or_else(|| "number answer requires `value`".to_string())?
                    .into_number()?;
                Ok(Self::Number { value })
            }
            "" => Err("answer kind cannot be empty".to_string()),
            _ => Ok(Self::Text {
                kind: wire.kind,
                text: wire
                    .text
                    .or_else(|| wire.value.map(WireValue::into_text))
                    .unwrap_or_default(),
            }),
        }
    }
}

impl From<RawAnswer> for WireAnswer {
    fn from(answer: RawAnswer) -> Self {
        let mut wire = WireAnswer {
            kind: answer.kind().to_owned(),
            index: None,
            indices: None,
            free_text: None,
            value: None,
            text: None,
        };
        match answer {
            RawAnswer::Select { index } => wire.index = Some(index),
            RawAnswer::Multi { indices, free_text } => {
                wire.indices = Some(indices);
                wire.free_text = free_text;
            }
            RawAnswer::Number { value } => wire.value = Some(WireValue::Number(value)),
            RawAnswer::Text { text, .. } => wire.text = Some(text),
        }
        wire
    }
}

/// Question id -> answer mapping that remembers insertion order.
///
/// Insertion order decides private token ids, so it is preserved through JSON
/// deserialisation. Equality compares contents only and ignores order.
#[derive(Debug, Clone, Default)]
pub struct AnswerSet {
    entries: Vec<(String, RawAnswer)>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an answer. An existing entry for the same question keeps its position and has
    /// its answer replaced.
    pub fn insert(&mut self, question_id: impl Into<String>, answer: RawAnswer) {
        let question_id = question_id.into();
        match self.entries.iter_mut().find(|(id, _)| *id == question_id) {
            Some((_, existing)) => *existing = answer,
            None => self.entries.push((question_id, answer)),
        }
    }

    pub fn get(&self, question_id: &str) -> Option<&RawAnswer> {
        self.entries
            .iter()
            .find(|(id, _)| id == question_id)
            .map(|(_, answer)| answer)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.get(question_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawAnswer)> {
        self.entries.iter().map(|(id, answer)| (id.as_str(), answer))
    }
}

impl PartialEq for AnswerSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(id, answer)| other.get(id) == Some(answer))
    }
}

impl Eq for AnswerSet {}

impl<K: Into<String>> FromIterator<(K, RawAnswer)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (K, RawAnswer)>>(iter: I) -> Self {
        let mut set = AnswerSet::new();
        for (id, answer) in iter {
            set.insert(id, answer);
        }
        set
    }
}

impl IntoIterator for AnswerSet {
    type Item = (String, RawAnswer);
    type IntoIter = std::vec::IntoIter<(String, RawAnswer)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl serde::Serialize for AnswerSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, answer) in &self.entries {
            map.serialize_entry(id, answer)?;
        }
        map.end()
    }
}

impl<'de> serde::Deserialize<'de> for AnswerSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct AnswerSetVisitor;

        impl<'de> Visitor<'de> for AnswerSetVisitor {
            type Value = AnswerSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of question ids to answers")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut set = AnswerSet::new();
                while let Some((id, answer)) = access.next_entry::<String, RawAnswer>()? {
                    set.insert(id, answer);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(AnswerSetVisitor)
    }
}
