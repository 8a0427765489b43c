use crate::attachment::Attachment;
use crate::error::{DecodeError, Result};
use crate::keys;
use crate::token::TokenValue;
use crate::value::ParameterValue;
use plist::{Dictionary, Value as Node};
use std::collections::BTreeMap;

/// One step of a shortcut.
///
/// `uuid`, `output_name` and `group_id` are written under the `UUID`,
/// `CustomOutputName` and `GroupingIdentifier` keys inside the action's
/// parameter dictionary, which is where the consumer reads them. Decoding
/// lifts them back out, so `parameters` never carries those three keys.
/// [`Action::with_parameter`] routes them onto the identity fields, and
/// [`Shortcut::validate_references`](crate::Shortcut::validate_references)
/// rejects a parameter map that holds one.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub identifier: String,
    pub parameters: BTreeMap<String, ParameterValue>,
    pub uuid: Option<String>,
    pub output_name: Option<String>,
    pub group_id: Option<String>,
}

impl Action {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            parameters: BTreeMap::new(),
            uuid: None,
            output_name: None,
            group_id: None,
        }
    }

    /// Set a parameter. `UUID`, `CustomOutputName` and `GroupingIdentifier`
    /// set the matching identity field instead; a non-string value for one
    /// of them cannot be written and is dropped with a warning.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        let key = key.into();
        let value = value.into();
        if !keys::is_reserved_parameter(&key) {
            self.parameters.insert(key, value);
            return self;
        }
        let ParameterValue::String(text) = value else {
            log::warn!(
                "Dropping non-string '{key}' on {}: identity fields must be strings",
                self.identifier
            );
            return self;
        };
        let field = match key.as_str() {
            keys::ACTION_UUID => &mut self.uuid,
            keys::ACTION_CUSTOM_OUTPUT_NAME => &mut self.output_name,
            _ => &mut self.group_id,
        };
        *field = Some(text);
        self
    }

    #[must_use]
    pub fn with_token(self, key: impl Into<String>, token: impl Into<TokenValue>) -> Self {
        let value = token.into().to_parameter_value();
        self.with_parameter(key, value)
    }

    #[must_use]
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    #[must_use]
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&ParameterValue> {
        self.parameters.get(key)
    }

    /// Attachment referencing this action's output. The custom output name,
    /// when set, wins over `default_name`. `None` if the action has no UUID.
    pub fn output_reference(&self, default_name: &str) -> Option<Attachment> {
        let uuid = self.uuid.as_deref()?;
        let name = self.output_name.as_deref().unwrap_or(default_name);
        Some(Attachment::action_output(uuid, name))
    }

    pub fn to_node(&self) -> Node {
        let mut parameters: Dictionary = self
            .parameters
            .iter()
            .map(|(key, value)| (key.clone(), value.to_node()))
            .collect();
        for (key, field) in [
            (keys::ACTION_UUID, &self.uuid),
            (keys::ACTION_CUSTOM_OUTPUT_NAME, &self.output_name),
            (keys::ACTION_GROUPING_IDENTIFIER, &self.group_id),
        ] {
            if let Some(value) = field {
                parameters.insert(key.to_string(), Node::String(value.clone()));
            }
        }

        let mut node = Dictionary::new();
        node.insert(
            keys::ACTION_IDENTIFIER.to_string(),
            Node::String(self.identifier.clone()),
        );
        node.insert(
            keys::ACTION_PARAMETERS.to_string(),
            Node::Dictionary(parameters),
        );
        Node::Dictionary(node)
    }

    /// Decode one entry of `WFWorkflowActions`. The identity keys are also
    /// accepted at the top level of the action dictionary.
    pub fn from_node(node: &Node) -> Result<Self> {
        let dict = node
            .as_dictionary()
            .ok_or_else(|| DecodeError::invalid(keys::WORKFLOW_ACTIONS, "array of dictionaries"))?;
        let identifier = match dict.get(keys::ACTION_IDENTIFIER) {
            Some(Node::String(s)) => s.clone(),
            Some(_) => return Err(DecodeError::invalid(keys::ACTION_IDENTIFIER, "string")),
            None => return Err(DecodeError::missing(keys::ACTION_IDENTIFIER)),
        };
        let mut parameters = match dict.get(keys::ACTION_PARAMETERS) {
            None => BTreeMap::new(),
            Some(raw) => match ParameterValue::from_node(raw)? {
                ParameterValue::Map(map) => map,
                _ => return Err(DecodeError::invalid(keys::ACTION_PARAMETERS, "dictionary")),
            },
        };

        let mut take = |key: &str| -> Result<Option<String>> {
            let nested = parameters.remove(key);
            let value = match nested {
                Some(value) => Some(value),
                None => dict.get(key).map(ParameterValue::from_node).transpose()?,
            };
            match value {
                None => Ok(None),
                Some(ParameterValue::String(s)) => Ok(Some(s)),
                Some(_) => Err(DecodeError::invalid(key, "string")),
            }
        };
        let uuid = take(keys::ACTION_UUID)?;
        let output_name = take(keys::ACTION_CUSTOM_OUTPUT_NAME)?;
        let group_id = take(keys::ACTION_GROUPING_IDENTIFIER)?;

        Ok(Self {
            identifier,
            parameters,
            uuid,
            output_name,
            group_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn optional_fields_are_omitted_not_null() {
        let node = Action::new("is.workflow.actions.comment")
            .with_parameter("WFCommentActionText", "note")
            .to_node();
        let params = node
            .as_dictionary()
            .and_then(|d| d.get(keys::ACTION_PARAMETERS))
            .and_then(Node::as_dictionary)
            .unwrap();
        assert_eq!(params.len(), 1);
        assert!(params.get(keys::ACTION_UUID).is_none());
        assert!(params.get(keys::ACTION_GROUPING_IDENTIFIER).is_none());
    }

    #[test]
    fn identity_fields_live_in_parameters() {
        let node = Action::new("is.workflow.actions.choosefrommenu")
            .with_uuid("U-1")
            .with_output_name("Choice")
            .with_group_id("G-1")
            .to_node();
        let dict = node.as_dictionary().unwrap();
        assert_eq!(
            dict.get(keys::ACTION_IDENTIFIER).and_then(Node::as_string),
            Some("is.workflow.actions.choosefrommenu")
        );
        let params = dict
            .get(keys::ACTION_PARAMETERS)
            .and_then(Node::as_dictionary)
            .unwrap();
        assert_eq!(params.get("UUID").and_then(Node::as_string), Some("U-1"));
        assert_eq!(
            params.get("CustomOutputName").and_then(Node::as_string),
            Some("Choice")
        );
        assert_eq!(
            params.get("GroupingIdentifier").and_then(Node::as_string),
            Some("G-1")
        );
    }

    #[test]
    fn decode_lifts_identity_fields_out_of_parameters() {
        let action = Action::new("is.workflow.actions.gettext")
            .with_uuid("U-9")
            .with_token("WFTextActionText", "hello");
        let decoded = Action::from_node(&action.to_node()).unwrap();
        assert_eq!(decoded, action);
        assert!(!decoded.parameters.contains_key("UUID"));
    }

    #[test]
    fn decode_accepts_top_level_identity_fields() {
        let mut dict = Dictionary::new();
        dict.insert(
            keys::ACTION_IDENTIFIER.to_string(),
            Node::String("is.workflow.actions.showresult".into()),
        );
        dict.insert("UUID".to_string(), Node::String("TOP".into()));
        let decoded = Action::from_node(&Node::Dictionary(dict)).unwrap();
        assert_eq!(decoded.uuid.as_deref(), Some("TOP"));
        assert!(decoded.parameters.is_empty());
    }

    #[test]
    fn missing_identifier_is_reported() {
        let err = Action::from_node(&Node::Dictionary(Dictionary::new())).unwrap_err();
        assert_eq!(err, DecodeError::missing(keys::ACTION_IDENTIFIER));
    }

    #[test]
    fn output_reference_prefers_custom_name() {
        let plain = Action::new("x").with_uuid("U");
        assert_eq!(
            plain.output_reference("Text"),
            Some(Attachment::action_output("U", "Text"))
        );
        let named = plain.clone().with_output_name("Greeting");
        assert_eq!(
            named.output_reference("Text"),
            Some(Attachment::action_output("U", "Greeting"))
        );
        assert_eq!(Action::new("x").output_reference("Text"), None);
    }

    #[test]
    fn identity_keys_passed_as_parameters_set_the_identity_fields() {
        let action = Action::new("is.workflow.actions.gettext")
            .with_parameter("UUID", "user-data")
            .with_parameter("CustomOutputName", "Greeting")
            .with_parameter("GroupingIdentifier", "G-2")
            .with_parameter("WFTextActionText", "hi");
        assert_eq!(action.uuid.as_deref(), Some("user-data"));
        assert_eq!(action.output_name.as_deref(), Some("Greeting"));
        assert_eq!(action.group_id.as_deref(), Some("G-2"));
        assert_eq!(action.parameters.len(), 1);

        let decoded = Action::from_node(&action.to_node()).unwrap();
        assert_eq!(decoded, action);
    }

    #[test]
    fn non_string_identity_parameter_is_dropped() {
        let action = Action::new("is.workflow.actions.choosefrommenu")
            .with_group_id("G-1")
            .with_parameter("GroupingIdentifier", ParameterValue::Int(7));
        assert_eq!(action.group_id.as_deref(), Some("G-1"));
        assert!(action.parameters.is_empty());
        assert!(Action::from_node(&action.to_node()).is_ok());
    }
}
