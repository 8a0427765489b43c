//! Lowering of caller-described actions (`build_shortcut`) into model actions.
//!
//! Parameters are plain JSON with a few `$`-prefixed object forms:
//!
//! ```text
//! {"$ref": "fetch"}                      output of the action labelled "fetch"
//! {"$ref": "fetch", "property": "Name",  ...refined by aggrandizements,
//!  "coerce": "WFDictionaryContentItem"}   applied in that order
//! {"$variable": "Total"}                 named variable
//! {"$magic": "clipboard"}                clipboard | current_date | ask | extension_input
//! {"$text": ["Hi ", {"$ref": "name"}]}   text with embedded variables
//! {"$base64": "3q2+7w=="}                raw bytes
//! ```

use serde_json::{Map, Value};
use shortcut_model::{
    keys, Action, Attachment, IdSource, ParameterValue, TokenString, TokenValue,
};
use std::collections::HashMap;
use thiserror::Error;

use super::schemas::build::RawAction;

const DEFAULT_OUTPUT_NAME: &str = "Output";

#[derive(Debug, Error, PartialEq)]
pub(crate) enum RawActionError {
    #[error("action {index} has an empty identifier")]
    EmptyIdentifier { index: usize },

    #[error("id '{id}' is used by actions {first} and {second}")]
    DuplicateId {
        id: String,
        first: usize,
        second: usize,
    },

    #[error("action {index} parameter '{key}' references unknown id '{reference}'")]
    UnknownReference {
        index: usize,
        key: String,
        reference: String,
    },

    #[error("action {index} parameter '{key}': {message}")]
    InvalidValue {
        index: usize,
        key: String,
        message: String,
    },
}

impl RawActionError {
    pub(crate) fn code(&self) -> &'static str {
        match self {
            Self::UnknownReference { .. } => "invalid_reference",
            Self::EmptyIdentifier { .. } | Self::DuplicateId { .. } | Self::InvalidValue { .. } => {
                "invalid_request"
            }
        }
    }
}

struct Target {
    uuid: String,
    output_name: Option<String>,
}

struct Lowering<'a> {
    targets: HashMap<&'a str, Target>,
    index: usize,
    key: String,
}

impl Lowering<'_> {
    fn invalid(&self, message: impl Into<String>) -> RawActionError {
        RawActionError::InvalidValue {
            index: self.index,
            key: self.key.clone(),
            message: message.into(),
        }
    }

    fn value(&self, value: &Value) -> Result<ParameterValue, RawActionError> {
        match value {
            Value::Object(map) => {
                if let Some(attachment) = self.attachment(map)? {
                    return Ok(TokenValue::Reference(attachment).to_parameter_value());
                }
                if let Some(parts) = map.get("$text") {
                    return self.text(parts);
                }
                if map.contains_key("$base64") {
                    return ParameterValue::from_json(value)
                        .map_err(|err| self.invalid(err.to_string()));
                }
                let mut out = std::collections::BTreeMap::new();
                for (key, nested) in map {
                    out.insert(key.clone(), self.value(nested)?);
                }
                Ok(ParameterValue::Map(out))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(ParameterValue::List),
            Value::Null => Err(self.invalid("null is not a parameter value")),
            scalar => ParameterValue::from_json(scalar).map_err(|err| self.invalid(err.to_string())),
        }
    }

    /// `Some` when `map` is one of the attachment forms.
    fn attachment(&self, map: &Map<String, Value>) -> Result<Option<Attachment>, RawActionError> {
        let base = if let Some(reference) = map.get("$ref") {
            let label = reference
                .as_str()
                .ok_or_else(|| self.invalid("$ref must be a string id"))?;
            let target = self
                .targets
                .get(label)
                .ok_or_else(|| RawActionError::UnknownReference {
                    index: self.index,
                    key: self.key.clone(),
                    reference: label.to_string(),
                })?;
            let name = map
                .get("outputName")
                .and_then(Value::as_str)
                .or(target.output_name.as_deref())
                .unwrap_or(DEFAULT_OUTPUT_NAME);
            Attachment::action_output(&target.uuid, name)
        } else if let Some(name) = map.get("$variable") {
            let name = name
                .as_str()
                .ok_or_else(|| self.invalid("$variable must be a string"))?;
            Attachment::variable(name)
        } else if let Some(magic) = map.get("$magic") {
            match magic.as_str() {
                Some("clipboard") => Attachment::clipboard(),
                Some("current_date") => Attachment::current_date(),
                Some("ask") => Attachment::ask(),
                Some("extension_input") => Attachment::extension_input(),
                _ => {
                    return Err(self.invalid(
                        "$magic must be clipboard, current_date, ask or extension_input",
                    ))
                }
            }
        } else {
            return Ok(None);
        };

        let mut attachment = base;
        if let Some(property) = map.get("property") {
            let property = property
                .as_str()
                .ok_or_else(|| self.invalid("property must be a string"))?;
            attachment = attachment.with_property(property);
        }
        if let Some(coerce) = map.get("coerce") {
            let coerce = coerce
                .as_str()
                .ok_or_else(|| self.invalid("coerce must be a string"))?;
            attachment = attachment.coerced_to(coerce);
        }
        Ok(Some(attachment))
    }

    fn text(&self, parts: &Value) -> Result<ParameterValue, RawActionError> {
        let parts = parts
            .as_array()
            .ok_or_else(|| self.invalid("$text must be an array of strings and references"))?;
        let mut builder = TokenString::builder();
        let mut literal = String::new();
        let mut has_attachment = false;
        for part in parts {
            match part {
                Value::String(text) => {
                    literal.push_str(text);
                    builder = builder.text(text);
                }
                Value::Object(map) => {
                    let attachment = self
                        .attachment(map)?
                        .ok_or_else(|| self.invalid("$text objects must be references"))?;
                    has_attachment = true;
                    builder = builder.attachment(attachment);
                }
                _ => return Err(self.invalid("$text parts must be strings or references")),
            }
        }
        if !has_attachment {
            return Ok(ParameterValue::String(literal));
        }
        let tokens = builder
            .build()
            .map_err(|err| self.invalid(err.to_string()))?;
        Ok(TokenValue::Composite(tokens).to_parameter_value())
    }
}

/// Assign a fresh UUID to every action, then resolve `$ref` labels against
/// those UUIDs. Ordering is not checked here; reference validation before
/// writing rejects forward references.
pub(crate) fn lower_raw_actions(
    raw: &[RawAction],
    ids: &mut dyn IdSource,
) -> Result<Vec<Action>, RawActionError> {
    let mut targets: HashMap<&str, Target> = HashMap::new();
    let mut first_use: HashMap<&str, usize> = HashMap::new();
    let mut uuids = Vec::with_capacity(raw.len());
    for (index, action) in raw.iter().enumerate() {
        if action.identifier.trim().is_empty() {
            return Err(RawActionError::EmptyIdentifier { index });
        }
        let uuid = ids.next_id();
        if let Some(label) = action.id.as_deref() {
            if let Some(&first) = first_use.get(label) {
                return Err(RawActionError::DuplicateId {
                    id: label.to_string(),
                    first,
                    second: index,
                });
            }
            first_use.insert(label, index);
            targets.insert(
                label,
                Target {
                    uuid: uuid.clone(),
                    output_name: action.output_name.clone(),
                },
            );
        }
        uuids.push(uuid);
    }

    let mut lowering = Lowering {
        targets,
        index: 0,
        key: String::new(),
    };
    let mut actions = Vec::with_capacity(raw.len());
    for ((index, spec), uuid) in raw.iter().enumerate().zip(uuids) {
        lowering.index = index;
        let mut action = Action::new(spec.identifier.trim()).with_uuid(uuid);
        for (key, value) in &spec.parameters {
            lowering.key = key.clone();
            if keys::is_reserved_parameter(key) {
                return Err(lowering.invalid("reserved; use id, output_name or group_id"));
            }
            action = action.with_parameter(key.as_str(), lowering.value(value)?);
        }
        if let Some(name) = &spec.output_name {
            action = action.with_output_name(name.as_str());
        }
        if let Some(group) = &spec.group_id {
            action = action.with_group_id(group.as_str());
        }
        actions.push(action);
    }
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shortcut_model::{SequentialIds, Shortcut, ValidationError};

    fn raw(value: Value) -> Vec<RawAction> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn refs_resolve_to_generated_uuids() {
        let actions = lower_raw_actions(
            &raw(json!([
                { "identifier": "is.workflow.actions.gettext", "id": "greeting",
                  "parameters": { "WFTextActionText": "hi" } },
                { "identifier": "is.workflow.actions.showresult",
                  "parameters": { "Text": { "$text": ["Said: ", { "$ref": "greeting" }] } } }
            ])),
            &mut SequentialIds::new(),
        )
        .unwrap();

        let token = TokenValue::from_parameter_value(actions[1].parameter("Text").unwrap()).unwrap();
        let TokenValue::Composite(tokens) = token else {
            panic!("expected composite text");
        };
        assert_eq!(tokens.text(), "Said: \u{FFFC}");
        let attachment = tokens.attachments().values().next().unwrap();
        assert_eq!(attachment.output_uuid(), actions[0].uuid.as_deref());

        let shortcut = Shortcut::builder("raw").actions(actions).build();
        shortcut.validate_references().unwrap();
    }

    #[test]
    fn bare_ref_with_aggrandizements() {
        let actions = lower_raw_actions(
            &raw(json!([
                { "identifier": "is.workflow.actions.downloadurl", "id": "fetch", "output_name": "Body" },
                { "identifier": "is.workflow.actions.getvalueforkey",
                  "parameters": { "WFInput": { "$ref": "fetch", "coerce": "WFDictionaryContentItem" } } }
            ])),
            &mut SequentialIds::new(),
        )
        .unwrap();
        let token =
            TokenValue::from_parameter_value(actions[1].parameter("WFInput").unwrap()).unwrap();
        let TokenValue::Reference(attachment) = token else {
            panic!("expected a bare reference");
        };
        assert_eq!(
            attachment,
            Attachment::action_output(actions[0].uuid.clone().unwrap(), "Body")
                .coerced_to("WFDictionaryContentItem")
        );
    }

    #[test]
    fn unknown_ref_is_an_invalid_reference() {
        let err = lower_raw_actions(
            &raw(json!([
                { "identifier": "is.workflow.actions.showresult",
                  "parameters": { "Text": { "$ref": "nope" } } }
            ])),
            &mut SequentialIds::new(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "invalid_reference");
    }

    #[test]
    fn forward_refs_lower_but_fail_validation() {
        let actions = lower_raw_actions(
            &raw(json!([
                { "identifier": "is.workflow.actions.showresult",
                  "parameters": { "Text": { "$ref": "later" } } },
                { "identifier": "is.workflow.actions.gettext", "id": "later" }
            ])),
            &mut SequentialIds::new(),
        )
        .unwrap();
        let shortcut = Shortcut::builder("raw").actions(actions).build();
        assert!(matches!(
            shortcut.validate_references(),
            Err(ValidationError::ForwardReference { .. })
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = lower_raw_actions(
            &raw(json!([
                { "identifier": "a", "id": "x" },
                { "identifier": "b", "id": "x" }
            ])),
            &mut SequentialIds::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            RawActionError::DuplicateId {
                id: "x".into(),
                first: 0,
                second: 1
            }
        );
    }

    #[test]
    fn plain_values_and_nested_maps_pass_through() {
        let actions = lower_raw_actions(
            &raw(json!([
                { "identifier": "is.workflow.actions.comment",
                  "parameters": {
                      "Count": 3,
                      "Blob": { "$base64": "3q2+7w==" },
                      "Nested": { "Inner": [true, "x"], "Clip": { "$magic": "clipboard" } }
                  } }
            ])),
            &mut SequentialIds::new(),
        )
        .unwrap();
        let action = &actions[0];
        assert_eq!(action.parameter("Count"), Some(&ParameterValue::Int(3)));
        assert_eq!(
            action.parameter("Blob"),
            Some(&ParameterValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]))
        );
        let nested = action.parameter("Nested").unwrap();
        assert_eq!(
            nested.get("Inner"),
            Some(&ParameterValue::List(vec![
                ParameterValue::Bool(true),
                ParameterValue::from("x")
            ]))
        );
        assert!(TokenValue::from_parameter_value(nested.get("Clip").unwrap()).is_ok());
    }

    #[test]
    fn null_parameters_are_rejected() {
        let err = lower_raw_actions(
            &raw(json!([{ "identifier": "a", "parameters": { "X": null } }])),
            &mut SequentialIds::new(),
        )
        .unwrap_err();
        assert!(matches!(err, RawActionError::InvalidValue { ref key, .. } if key == "X"));
    }

    #[test]
    fn identity_keys_cannot_be_passed_as_parameters() {
        let err = lower_raw_actions(
            &raw(json!([{
                "identifier": "is.workflow.actions.gettext",
                "parameters": { "UUID": "user-data", "WFTextActionText": "hi" }
            }])),
            &mut SequentialIds::new(),
        )
        .unwrap_err();
        assert!(matches!(err, RawActionError::InvalidValue { index: 0, ref key, .. } if key == "UUID"));
        assert_eq!(err.code(), "invalid_request");
    }
}
