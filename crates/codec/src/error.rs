#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("varint ended unexpectedly at offset {offset}")]
    MalformedVarint { offset: usize },
    #[error("varint at offset {offset} exceeds 32 bits")]
    VarintOverflow { offset: usize },
    #[error("record at offset {offset} is truncated")]
    TruncatedRecord { offset: usize },
    #[error("question id at offset {offset} is not valid UTF-8")]
    InvalidQuestionId { offset: usize },
    #[error("unknown answer type tag: {0}")]
    UnknownAnswerType(u32),
    #[error("invalid Base62 character: {0:?}")]
    InvalidBase62Char(char),
    #[error("unknown answer kind {kind:?} (question {question_id})")]
    UnknownAnswerKind { question_id: String, kind: String },
    #[error("question id {0:?} uses the reserved free-text suffix")]
    ReservedQuestionId(String),

    #[error("answers must not be empty")]
    EmptyAnswers,
    #[error("{0} is missing")]
    MissingInput(&'static str),
    #[error("invalid passphrase: {0}")]
    PassphraseTooShort(#[from] anamnese_types::TextError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed private payload: {0}")]
    MalformedPayload(&'static str),
    #[error("private payload could not be decrypted")]
    AuthenticationFailed,
    #[error("encryption failed")]
    Encryption,
    #[error("random source failed: {0}")]
    Randomness(String),
    #[error("failed to serialize private payload: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize private payload: {0}")]
    Deserialization(serde_json::Error),

    #[error("failed to compress static stream: {0}")]
    Compression(std::io::Error),
    #[error("failed to decompress static stream (compress flag mismatch?): {0}")]
    Decompression(std::io::Error),
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;
