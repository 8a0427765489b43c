use crate::error::{DecodeError, Result};
use crate::keys;
use crate::value::ParameterValue;
use std::collections::BTreeMap;

/// Modifier applied to an attachment's resolved value. Order matters: the
/// consumer applies them left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggrandizement {
    /// Read a named property of the value (e.g. `Name`, `File Size`)
    GetProperty(String),
    /// Coerce the value to a content item class (e.g. `WFStringContentItem`)
    Coerce(String),
}

impl Aggrandizement {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::GetProperty(_) => keys::AGGRANDIZEMENT_PROPERTY,
            Self::Coerce(_) => keys::AGGRANDIZEMENT_COERCION,
        }
    }

    pub fn to_map(&self) -> ParameterValue {
        let mut map = BTreeMap::new();
        map.insert(
            keys::AGGRANDIZEMENT_TYPE.to_string(),
            ParameterValue::from(self.type_tag()),
        );
        match self {
            Self::GetProperty(name) => {
                map.insert(
                    keys::AGGRANDIZEMENT_PROPERTY_NAME.to_string(),
                    ParameterValue::from(name.as_str()),
                );
            }
            Self::Coerce(class) => {
                map.insert(
                    keys::AGGRANDIZEMENT_COERCION_ITEM_CLASS.to_string(),
                    ParameterValue::from(class.as_str()),
                );
            }
        }
        ParameterValue::Map(map)
    }

    pub fn from_map(value: &ParameterValue) -> Result<Self> {
        let tag = required_str(value, keys::AGGRANDIZEMENT_TYPE)?;
        match tag {
            keys::AGGRANDIZEMENT_PROPERTY => Ok(Self::GetProperty(
                required_str(value, keys::AGGRANDIZEMENT_PROPERTY_NAME)?.to_string(),
            )),
            keys::AGGRANDIZEMENT_COERCION => Ok(Self::Coerce(
                required_str(value, keys::AGGRANDIZEMENT_COERCION_ITEM_CLASS)?.to_string(),
            )),
            _ => Err(DecodeError::invalid(
                keys::AGGRANDIZEMENT_TYPE,
                "WFPropertyVariableAggrandizement or WFCoercionVariableAggrandizement",
            )),
        }
    }
}

/// Where an attachment's value comes from at run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    /// Output of an earlier action, addressed by that action's UUID
    ActionOutput {
        output_uuid: String,
        output_name: String,
    },
    /// Input passed to the shortcut (share sheet, widget, ...)
    ExtensionInput,
    /// A named variable set by a `setvariable` action
    Variable { name: String },
    Clipboard,
    CurrentDate,
    /// Ask the user each time the shortcut runs
    Ask,
}

impl AttachmentSource {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::ActionOutput { .. } => "ActionOutput",
            Self::ExtensionInput => "ExtensionInput",
            Self::Variable { .. } => "Variable",
            Self::Clipboard => "Clipboard",
            Self::CurrentDate => "CurrentDate",
            Self::Ask => "Ask",
        }
    }
}

/// A run-time value reference, optionally refined by aggrandizements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub source: AttachmentSource,
    pub aggrandizements: Vec<Aggrandizement>,
}

impl Attachment {
    pub fn new(source: AttachmentSource) -> Self {
        Self {
            source,
            aggrandizements: Vec::new(),
        }
    }

    /// Magic variable pointing at the output of the action with `output_uuid`.
    pub fn action_output(output_uuid: impl Into<String>, output_name: impl Into<String>) -> Self {
        Self::new(AttachmentSource::ActionOutput {
            output_uuid: output_uuid.into(),
            output_name: output_name.into(),
        })
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(AttachmentSource::Variable { name: name.into() })
    }

    pub fn extension_input() -> Self {
        Self::new(AttachmentSource::ExtensionInput)
    }

    pub fn clipboard() -> Self {
        Self::new(AttachmentSource::Clipboard)
    }

    pub fn current_date() -> Self {
        Self::new(AttachmentSource::CurrentDate)
    }

    pub fn ask() -> Self {
        Self::new(AttachmentSource::Ask)
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>) -> Self {
        self.aggrandizements
            .push(Aggrandizement::GetProperty(name.into()));
        self
    }

    #[must_use]
    pub fn coerced_to(mut self, item_class: impl Into<String>) -> Self {
        self.aggrandizements
            .push(Aggrandizement::Coerce(item_class.into()));
        self
    }

    /// UUID of the referenced action, for `ActionOutput` attachments only.
    pub fn output_uuid(&self) -> Option<&str> {
        match &self.source {
            AttachmentSource::ActionOutput { output_uuid, .. } => Some(output_uuid),
            _ => None,
        }
    }

    /// Container map for this attachment. `Aggrandizements` is omitted, not
    /// emitted empty, when there are no modifiers.
    pub fn to_map(&self) -> ParameterValue {
        let mut map = BTreeMap::new();
        map.insert(
            keys::ATTACHMENT_TYPE.to_string(),
            ParameterValue::from(self.source.type_tag()),
        );
        match &self.source {
            AttachmentSource::ActionOutput {
                output_uuid,
                output_name,
            } => {
                map.insert(
                    keys::ATTACHMENT_OUTPUT_UUID.to_string(),
                    ParameterValue::from(output_uuid.as_str()),
                );
                map.insert(
                    keys::ATTACHMENT_OUTPUT_NAME.to_string(),
                    ParameterValue::from(output_name.as_str()),
                );
            }
            AttachmentSource::Variable { name } => {
                map.insert(
                    keys::ATTACHMENT_VARIABLE_NAME.to_string(),
                    ParameterValue::from(name.as_str()),
                );
            }
            AttachmentSource::ExtensionInput
            | AttachmentSource::Clipboard
            | AttachmentSource::CurrentDate
            | AttachmentSource::Ask => {}
        }
        if !self.aggrandizements.is_empty() {
            map.insert(
                keys::ATTACHMENT_AGGRANDIZEMENTS.to_string(),
                ParameterValue::List(
                    self.aggrandizements
                        .iter()
                        .map(Aggrandizement::to_map)
                        .collect(),
                ),
            );
        }
        ParameterValue::Map(map)
    }

    pub fn from_map(value: &ParameterValue) -> Result<Self> {
        if value.as_map().is_none() {
            return Err(DecodeError::invalid("attachment", "dictionary"));
        }
        let source = match required_str(value, keys::ATTACHMENT_TYPE)? {
            "ActionOutput" => AttachmentSource::ActionOutput {
                output_uuid: required_str(value, keys::ATTACHMENT_OUTPUT_UUID)?.to_string(),
                output_name: required_str(value, keys::ATTACHMENT_OUTPUT_NAME)?.to_string(),
            },
            "Variable" => AttachmentSource::Variable {
                name: required_str(value, keys::ATTACHMENT_VARIABLE_NAME)?.to_string(),
            },
            "ExtensionInput" => AttachmentSource::ExtensionInput,
            "Clipboard" => AttachmentSource::Clipboard,
            "CurrentDate" => AttachmentSource::CurrentDate,
            "Ask" => AttachmentSource::Ask,
            _ => {
                return Err(DecodeError::invalid(
                    keys::ATTACHMENT_TYPE,
                    "ActionOutput, ExtensionInput, Variable, Clipboard, CurrentDate or Ask",
                ))
            }
        };
        let aggrandizements = match value.get(keys::ATTACHMENT_AGGRANDIZEMENTS) {
            None => Vec::new(),
            Some(ParameterValue::List(items)) => items
                .iter()
                .map(Aggrandizement::from_map)
                .collect::<Result<Vec<_>>>()?,
            Some(_) => {
                return Err(DecodeError::invalid(
                    keys::ATTACHMENT_AGGRANDIZEMENTS,
                    "array",
                ))
            }
        };
        Ok(Self {
            source,
            aggrandizements,
        })
    }
}

pub(crate) fn required_str<'a>(value: &'a ParameterValue, key: &str) -> Result<&'a str> {
    match value.get(key) {
        Some(ParameterValue::String(s)) => Ok(s),
        Some(_) => Err(DecodeError::invalid(key, "string")),
        None => Err(DecodeError::missing(key)),
    }
}
