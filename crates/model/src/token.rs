use crate::attachment::{required_str, Attachment};
use crate::error::{DecodeError, Result, TokenError};
use crate::keys;
use crate::value::ParameterValue;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Object replacement character marking where an attachment is spliced in.
pub const PLACEHOLDER: char = '\u{FFFC}';

/// `{location,length}` key of `attachmentsByRange`.
///
/// Locations are UTF-16 code-unit offsets, which is how the consumer measures
/// ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenRange {
    pub location: usize,
    pub length: usize,
}

impl TokenRange {
    pub const fn placeholder(location: usize) -> Self {
        Self {
            location,
            length: 1,
        }
    }
}

impl fmt::Display for TokenRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{}}}", self.location, self.length)
    }
}

impl FromStr for TokenRange {
    type Err = TokenError;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || TokenError::InvalidRangeKey(raw.to_string());
        let inner = raw
            .trim()
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(invalid)?;
        let (location, length) = inner.split_once(',').ok_or_else(invalid)?;
        Ok(Self {
            location: location.trim().parse().map_err(|_| invalid())?,
            length: length.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// Text with embedded attachment placeholders.
///
/// Every range key points at a U+FFFC in `text`; construction enforces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenString {
    text: String,
    attachments: BTreeMap<TokenRange, Attachment>,
}

impl TokenString {
    /// `"\u{FFFC}"` with the attachment at `{0,1}`.
    pub fn single(attachment: Attachment) -> Self {
        let mut attachments = BTreeMap::new();
        attachments.insert(TokenRange::placeholder(0), attachment);
        Self {
            text: PLACEHOLDER.to_string(),
            attachments,
        }
    }

    pub fn builder() -> TokenStringBuilder {
        TokenStringBuilder::default()
    }

    /// Validate externally supplied ranges against the placeholders in `text`.
    pub fn from_parts(
        text: impl Into<String>,
        attachments: impl IntoIterator<Item = (TokenRange, Attachment)>,
    ) -> std::result::Result<Self, TokenError> {
        let text = text.into();
        let attachments: BTreeMap<_, _> = attachments.into_iter().collect();
        if attachments.is_empty() {
            return Err(TokenError::EmptyTokenString);
        }
        let positions: BTreeSet<usize> = placeholder_offsets(&text).collect();
        let text_length = text.encode_utf16().count();
        for range in attachments.keys() {
            if range.location >= text_length {
                return Err(TokenError::RangeOutOfBounds {
                    location: range.location,
                    text_length,
                });
            }
            if range.length != 1 {
                return Err(TokenError::UnsupportedLength {
                    location: range.location,
                    length: range.length,
                });
            }
            if !positions.contains(&range.location) {
                return Err(TokenError::PlaceholderMismatch {
                    location: range.location,
                });
            }
        }
        Ok(Self { text, attachments })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attachments(&self) -> &BTreeMap<TokenRange, Attachment> {
        &self.attachments
    }

    /// UTF-16 offsets of every placeholder in the text.
    pub fn placeholder_positions(&self) -> Vec<usize> {
        placeholder_offsets(&self.text).collect()
    }

    fn to_value_map(&self) -> ParameterValue {
        let ranges = self
            .attachments
            .iter()
            .map(|(range, attachment)| (range.to_string(), attachment.to_map()));
        ParameterValue::map([
            (keys::TOKEN_STRING, ParameterValue::from(self.text.as_str())),
            (keys::TOKEN_ATTACHMENTS_BY_RANGE, ParameterValue::map(ranges)),
        ])
    }

    fn from_value_map(value: &ParameterValue) -> Result<Self> {
        let text = required_str(value, keys::TOKEN_STRING)?;
        let ranges = match value.get(keys::TOKEN_ATTACHMENTS_BY_RANGE) {
            Some(ParameterValue::Map(map)) => map,
            Some(_) => {
                return Err(DecodeError::invalid(
                    keys::TOKEN_ATTACHMENTS_BY_RANGE,
                    "dictionary",
                ))
            }
            None => return Err(DecodeError::missing(keys::TOKEN_ATTACHMENTS_BY_RANGE)),
        };
        let mut attachments = Vec::with_capacity(ranges.len());
        for (key, attachment) in ranges {
            let range = key.parse::<TokenRange>()?;
            attachments.push((range, Attachment::from_map(attachment)?));
        }
        Ok(Self::from_parts(text, attachments)?)
    }
}

fn placeholder_offsets(text: &str) -> impl Iterator<Item = usize> + '_ {
    text.chars()
        .scan(0usize, |offset, ch| {
            let at = *offset;
            *offset += ch.len_utf16();
            Some((at, ch))
        })
        .filter(|(_, ch)| *ch == PLACEHOLDER)
        .map(|(at, _)| at)
}

/// Builds a [`TokenString`] piece by piece so ranges are correct by construction.
#[derive(Debug, Default)]
pub struct TokenStringBuilder {
    text: String,
    utf16_len: usize,
    attachments: BTreeMap<TokenRange, Attachment>,
}

impl TokenStringBuilder {
    /// Append literal text. Stray U+FFFC characters are dropped so they cannot
    /// be mistaken for attachment slots.
    #[must_use]
    pub fn text(mut self, literal: &str) -> Self {
        for ch in literal.chars().filter(|ch| *ch != PLACEHOLDER) {
            self.text.push(ch);
            self.utf16_len += ch.len_utf16();
        }
        self
    }

    #[must_use]
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments
            .insert(TokenRange::placeholder(self.utf16_len), attachment);
        self.text.push(PLACEHOLDER);
        self.utf16_len += PLACEHOLDER.len_utf16();
        self
    }

    pub fn build(self) -> std::result::Result<TokenString, TokenError> {
        if self.attachments.is_empty() {
            return Err(TokenError::EmptyTokenString);
        }
        Ok(TokenString {
            text: self.text,
            attachments: self.attachments,
        })
    }
}

/// A parameter that may be plain text, text with references, or one bare reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    Literal(String),
    Composite(TokenString),
    Reference(Attachment),
}

impl TokenValue {
    pub fn to_parameter_value(&self) -> ParameterValue {
        match self {
            Self::Literal(text) => ParameterValue::String(text.clone()),
            Self::Composite(tokens) => wrap(tokens.to_value_map(), keys::SERIALIZATION_TOKEN_STRING),
            Self::Reference(attachment) => {
                wrap(attachment.to_map(), keys::SERIALIZATION_TOKEN_ATTACHMENT)
            }
        }
    }

    pub fn from_parameter_value(value: &ParameterValue) -> Result<Self> {
        if let ParameterValue::String(text) = value {
            return Ok(Self::Literal(text.clone()));
        }
        let inner = value
            .get(keys::TOKEN_VALUE)
            .ok_or_else(|| DecodeError::missing(keys::TOKEN_VALUE))?;
        match required_str(value, keys::TOKEN_SERIALIZATION_TYPE)? {
            keys::SERIALIZATION_TOKEN_STRING => {
                Ok(Self::Composite(TokenString::from_value_map(inner)?))
            }
            keys::SERIALIZATION_TOKEN_ATTACHMENT => {
                Ok(Self::Reference(Attachment::from_map(inner)?))
            }
            _ => Err(DecodeError::invalid(
                keys::TOKEN_SERIALIZATION_TYPE,
                "WFTextTokenString or WFTextTokenAttachment",
            )),
        }
    }

    /// Every attachment carried by this value, in range order.
    pub fn attachments(&self) -> Vec<&Attachment> {
        match self {
            Self::Literal(_) => Vec::new(),
            Self::Composite(tokens) => tokens.attachments().values().collect(),
            Self::Reference(attachment) => vec![attachment],
        }
    }
}

fn wrap(inner: ParameterValue, serialization_type: &str) -> ParameterValue {
    ParameterValue::map([
        (keys::TOKEN_VALUE, inner),
        (
            keys::TOKEN_SERIALIZATION_TYPE,
            ParameterValue::from(serialization_type),
        ),
    ])
}

impl From<&str> for TokenValue {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for TokenValue {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<Attachment> for TokenValue {
    fn from(value: Attachment) -> Self {
        Self::Reference(value)
    }
}

impl From<TokenString> for TokenValue {
    fn from(value: TokenString) -> Self {
        Self::Composite(value)
    }
}
