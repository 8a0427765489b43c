use thiserror::Error;

/// Result type for decoding operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors raised while turning container bytes or nodes back into the model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The bytes are not a property list, or the root is not a dictionary
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// A node type the value universe cannot hold (dates, UIDs, JSON null, ...)
    #[error("Unrepresentable node: {0}")]
    UnrepresentableNode(String),

    /// A required key is absent
    #[error("Missing required field `{field}`")]
    MissingField { field: String },

    /// A key is present but holds the wrong kind of value
    #[error("Invalid field `{field}`: expected {expected}")]
    InvalidField { field: String, expected: String },

    /// A token string violates the placeholder/range invariant
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),
}

impl DecodeError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedContainer(msg.into())
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            expected: expected.into(),
        }
    }
}

/// Violations of the token string placeholder invariant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("no U+FFFC placeholder at offset {location}")]
    PlaceholderMismatch { location: usize },

    #[error("range starting at {location} lies outside text of {text_length} UTF-16 units")]
    RangeOutOfBounds { location: usize, text_length: usize },

    #[error("range {{{location},{length}}} must cover exactly one placeholder")]
    UnsupportedLength { location: usize, length: usize },

    #[error("token string has no attachments")]
    EmptyTokenString,

    #[error("invalid range key `{0}` (expected `{{location,length}}`)")]
    InvalidRangeKey(String),
}

/// The container codec refused to write a node tree
#[derive(Error, Debug)]
#[error("Encode error: {0}")]
pub struct EncodeError(#[from] pub plist::Error);

/// Reference and identity problems found by the pre-encode validation pass
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("action {action_index} references unknown action output {output_uuid}")]
    DanglingReference {
        action_index: usize,
        output_uuid: String,
    },

    #[error(
        "action {action_index} references output {output_uuid} of action {target_index}, which does not precede it"
    )]
    ForwardReference {
        action_index: usize,
        output_uuid: String,
        target_index: usize,
    },

    #[error("action {action_index} sets reserved parameter '{key}'; use its identity field instead")]
    ReservedParameter { action_index: usize, key: String },

    #[error("actions {first_index} and {second_index} share UUID {uuid}")]
    DuplicateUuid {
        uuid: String,
        first_index: usize,
        second_index: usize,
    },
}
