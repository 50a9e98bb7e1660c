//! Binary record stream for static answers.
//!
//! Each record is laid out as:
//!
//! ```text
//! varint(id_len) | id (UTF-8) | varint(answer_type) | varint(payload_len) | payload
//! ```
//!
//! Records are concatenated without separators until the buffer ends. Scalar types carry a
//! single varint payload; [`AnswerType::MultiIndexList`] carries `varint(count)` followed by
//! `count` varints.
//!
//! Records are written in ascending byte order of the question id so equal answer sets give
//! byte-identical streams. The order carries no meaning and decoding does not rely on it.

use crate::varint;
use crate::{CodecError, CodecResult};
use std::collections::BTreeMap;

/// Wire tag of a static record. These values must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AnswerType {
    SelectIndex = 1,
    MultiIndexList = 2,
    NumberU32 = 3,
    TextRef = 4,
}

impl AnswerType {
    pub fn tag(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for AnswerType {
    type Error = CodecError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Self::SelectIndex),
            2 => Ok(Self::MultiIndexList),
            3 => Ok(Self::NumberU32),
            4 => Ok(Self::TextRef),
            other => Err(CodecError::UnknownAnswerType(other)),
        }
    }
}

/// A non-identifying answer as it appears in the static code.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StaticAnswer {
    Select {
        index: u32,
    },
    Multi {
        indices: Vec<u32>,
    },
    Number {
        value: u32,
    },
    /// Placeholder pointing into the private token list.
    #[serde(rename_all = "camelCase")]
    TextRef {
        token_id: u32,
    },
}

impl StaticAnswer {
    pub fn answer_type(&self) -> AnswerType {
        match self {
            Self::Select { .. } => AnswerType::SelectIndex,
            Self::Multi { .. } => AnswerType::MultiIndexList,
            Self::Number { .. } => AnswerType::NumberU32,
            Self::TextRef { .. } => AnswerType::TextRef,
        }
    }

    fn payload(&self) -> Vec<u8> {
        match self {
            Self::Select { index: v } | Self::Number { value: v } | Self::TextRef { token_id: v } => {
                varint::encode(*v)
            }
            Self::Multi { indices } => {
                let mut out = Vec::with_capacity(1 + indices.len());
                varint::encode_into(indices.len() as u32, &mut out);
                for index in indices {
                    varint::encode_into(*index, &mut out);
                }
                out
            }
        }
    }
}

/// Appends one record to `out`.
pub fn encode_record(question_id: &str, answer_type: AnswerType, payload: &[u8], out: &mut Vec<u8>) {
    let id = question_id.as_bytes();
    varint::encode_into(id.len() as u32, out);
    out.extend_from_slice(id);
    varint::encode_into(answer_type.tag(), out);
    varint::encode_into(payload.len() as u32, out);
    out.extend_from_slice(payload);
}

/// Serialises every record in ascending question id order.
pub fn encode_records(records: &BTreeMap<String, StaticAnswer>) -> Vec<u8> {
    let mut out = Vec::new();
    for (question_id, answer) in records {
        encode_record(question_id, answer.answer_type(), &answer.payload(), &mut out);
    }
    out
}

/// Parses a complete record stream.
///
/// A question id appearing twice keeps the last record.
pub fn decode_records(bytes: &[u8]) -> CodecResult<BTreeMap<String, StaticAnswer>> {
    let mut out = BTreeMap::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let record_start = offset;

        let (id_len, next) = varint::decode(bytes, offset)?;
        let id_bytes = take(bytes, next, id_len, record_start)?;
        let question_id = std::str::from_utf8(id_bytes)
            .map_err(|_| CodecError::InvalidQuestionId {
                offset: record_start,
            })?
            .to_owned();
        offset = next + id_bytes.len();

        let (tag, next) = varint::decode(bytes, offset)?;
        let answer_type = AnswerType::try_from(tag)?;

        let (payload_len, next) = varint::decode(bytes, next)?;
        let payload = take(bytes, next, payload_len, record_start)?;
        offset = next + payload.len();

        out.insert(question_id, decode_payload(answer_type, payload)?);
    }

    Ok(out)
}

fn take(bytes: &[u8], start: usize, len: u32, record_start: usize) -> CodecResult<&[u8]> {
    start
        .checked_add(len as usize)
        .and_then(|end| bytes.get(start..end))
        .ok_or(CodecError::TruncatedRecord {
            offset: record_start,
        })
}

fn decode_payload(answer_type: AnswerType, payload: &[u8]) -> CodecResult<StaticAnswer> {
    Ok(match answer_type {
        AnswerType::SelectIndex => StaticAnswer::Select {
            index: varint::decode(payload, 0)?.0,
        },
        AnswerType::MultiIndexList => StaticAnswer::Multi {
            indices: decode_indices(payload)?,
        },
        AnswerType::NumberU32 => StaticAnswer::Number {
            value: varint::decode(payload, 0)?.0,
        },
        AnswerType::TextRef => StaticAnswer::TextRef {
            token_id: varint::decode(payload, 0)?.0,
        },
    })
}

fn decode_indices(payload: &[u8]) -> CodecResult<Vec<u32>> {
    let (count, mut offset) = varint::decode(payload, 0)?;
    // Each index takes at least one byte, so `count` cannot usefully exceed the payload size.
    let mut indices = Vec::with_capacity((count as usize).min(payload.len()));
    for _ in 0..count {
        let (index, next) = varint::decode(payload, offset)?;
        indices.push(index);
        offset = next;
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BTreeMap<String, StaticAnswer> {
        let mut records = BTreeMap::new();
        records.insert("4001".to_string(), StaticAnswer::Number { value: 83 });
        records.insert("0002".to_string(), StaticAnswer::Select { index: 1 });
        records.insert(
            "1005".to_string(),
            StaticAnswer::Multi {
                indices: vec![0, 2, 4],
            },
        );
        records.insert("3003".to_string(), StaticAnswer::TextRef { token_id: 0 });
        records
    }

    #[test]
    fn test_answer_type_tags_are_stable() {
        assert_eq!(AnswerType::SelectIndex.tag(), 1);
        assert_eq!(AnswerType::MultiIndexList.tag(), 2);
        assert_eq!(AnswerType::NumberU32.tag(), 3);
        assert_eq!(AnswerType::TextRef.tag(), 4);
    }

    #[test]
    fn test_encode_record_layout() {
        let mut out = Vec::new();
        encode_record("0002", AnswerType::SelectIndex, &[0x01], &mut out);
        assert_eq!(out, vec![4, b'0', b'0', b'0', b'2', 1, 1, 1]);
    }

    #[test]
    fn test_records_are_sorted_by_question_id() {
        let bytes = encode_records(&sample());
        // First record must be "0002".
        assert_eq!(&bytes[..5], &[4, b'0', b'0', b'0', b'2']);
    }

    #[test]
    fn test_decode_restores_records() {
        let records = sample();
        let decoded = decode_records(&encode_records(&records)).unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn test_decode_does_not_depend_on_order() {
        let mut bytes = Vec::new();
        encode_record("b", AnswerType::NumberU32, &varint::encode(7), &mut bytes);
        encode_record("a", AnswerType::SelectIndex, &varint::encode(2), &mut bytes);

        let decoded = decode_records(&bytes).unwrap();
        assert_eq!(decoded["a"], StaticAnswer::Select { index: 2 });
        assert_eq!(decoded["b"], StaticAnswer::Number { value: 7 });
    }

    #[test]
    fn test_empty_multi_list() {
        let mut records = BTreeMap::new();
        records.insert("m".to_string(), StaticAnswer::Multi { indices: vec![] });
        let decoded = decode_records(&encode_records(&records)).unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn test_unknown_answer_type() {
        let mut bytes = Vec::new();
        encode_record("x", AnswerType::SelectIndex, &[0x01], &mut bytes);
        // Patch the type tag.
        bytes[2] = 9;
        assert!(matches!(
            decode_records(&bytes),
            Err(CodecError::UnknownAnswerType(9))
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let mut bytes = Vec::new();
        encode_record(
            "m",
            AnswerType::MultiIndexList,
            &[0x02, 0x01, 0x02],
            &mut bytes,
        );
        bytes.pop();
        assert!(matches!(
            decode_records(&bytes),
            Err(CodecError::TruncatedRecord { offset: 0 })
        ));
    }

    #[test]
    fn test_truncated_question_id() {
        let bytes = [10, b'a', b'b'];
        assert!(matches!(
            decode_records(&bytes),
            Err(CodecError::TruncatedRecord { .. })
        ));
    }

    #[test]
    fn test_multi_count_beyond_payload_is_malformed() {
        let mut bytes = Vec::new();
        encode_record("m", AnswerType::MultiIndexList, &[0x05, 0x01], &mut bytes);
        assert!(matches!(
            decode_records(&bytes),
            Err(CodecError::MalformedVarint { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_question_id() {
        let mut bytes = vec![2, 0xff, 0xfe];
        bytes.extend_from_slice(&[1, 1, 0]);
        assert!(matches!(
            decode_records(&bytes),
            Err(CodecError::InvalidQuestionId { offset: 0 })
        ));
    }

    #[test]
    fn test_static_answer_json_shape() {
        let json = serde_json::to_value(StaticAnswer::TextRef { token_id: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "textRef", "tokenId": 3}));
    }
}
