use crate::action::Action;
use crate::error::{DecodeError, EncodeError, Result};
use crate::keys;
use crate::value::ParameterValue;
use plist::{Dictionary, Value as Node};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

/// Input classes accepted by a freshly created shortcut.
pub const DEFAULT_INPUT_CONTENT_ITEM_CLASSES: &[&str] = &[
    "WFAppStoreAppContentItem",
    "WFArticleContentItem",
    "WFContactContentItem",
    "WFDateContentItem",
    "WFEmailAddressContentItem",
    "WFGenericFileContentItem",
    "WFImageContentItem",
    "WFiTunesProductContentItem",
    "WFLocationContentItem",
    "WFDCMapsLinkContentItem",
    "WFAVAssetContentItem",
    "WFPDFContentItem",
    "WFPhoneNumberContentItem",
    "WFRichTextContentItem",
    "WFSafariWebPageContentItem",
    "WFStringContentItem",
    "WFURLContentItem",
];

const DEFAULT_GLYPH_NUMBER: i64 = 59511;
const DEFAULT_START_COLOR: i64 = 4_282_601_983;
const DEFAULT_MINIMUM_CLIENT_VERSION: i64 = 900;
const DEFAULT_CLIENT_VERSION: &str = "2302.0.4";

/// Physical encoding handed to the container codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerFormat {
    /// Compact binary property list (production output)
    #[default]
    Binary,
    /// XML property list (debugging)
    Xml,
}

impl ContainerFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerFormat {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "binary" | "bplist" => Ok(Self::Binary),
            "xml" | "text" => Ok(Self::Xml),
            other => Err(format!("unknown container format '{other}' (expected binary|xml)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub glyph_number: i64,
    pub start_color: i64,
    pub image_data: Option<Vec<u8>>,
}

impl Default for Icon {
    fn default() -> Self {
        Self {
            glyph_number: DEFAULT_GLYPH_NUMBER,
            start_color: DEFAULT_START_COLOR,
            image_data: None,
        }
    }
}

impl Icon {
    fn to_node(&self) -> Node {
        let mut dict = Dictionary::new();
        dict.insert(
            keys::ICON_GLYPH_NUMBER.to_string(),
            Node::Integer(self.glyph_number.into()),
        );
        dict.insert(
            keys::ICON_START_COLOR.to_string(),
            Node::Integer(self.start_color.into()),
        );
        if let Some(data) = &self.image_data {
            dict.insert(keys::ICON_IMAGE_DATA.to_string(), Node::Data(data.clone()));
        }
        Node::Dictionary(dict)
    }

    fn from_node(node: &Node) -> Result<Self> {
        let dict = node
            .as_dictionary()
            .ok_or_else(|| DecodeError::invalid(keys::WORKFLOW_ICON, "dictionary"))?;
        let image_data = match dict.get(keys::ICON_IMAGE_DATA) {
            None => None,
            Some(Node::Data(bytes)) => Some(bytes.clone()),
            Some(_) => return Err(DecodeError::invalid(keys::ICON_IMAGE_DATA, "data")),
        };
        Ok(Self {
            glyph_number: require_int(dict, keys::ICON_GLYPH_NUMBER)?,
            start_color: require_int(dict, keys::ICON_START_COLOR)?,
            image_data,
        })
    }
}

/// A question the consumer asks when the shortcut is imported, whose answer
/// replaces `parameter_key` of the action at `action_index`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportQuestion {
    pub action_index: i64,
    pub parameter_key: String,
    pub category: Option<String>,
    pub default_value: Option<ParameterValue>,
    pub text: Option<String>,
}

impl ImportQuestion {
    fn to_node(&self) -> Node {
        let mut dict = Dictionary::new();
        dict.insert(
            keys::QUESTION_ACTION_INDEX.to_string(),
            Node::Integer(self.action_index.into()),
        );
        dict.insert(
            keys::QUESTION_PARAMETER_KEY.to_string(),
            Node::String(self.parameter_key.clone()),
        );
        if let Some(category) = &self.category {
            dict.insert(
                keys::QUESTION_CATEGORY.to_string(),
                Node::String(category.clone()),
            );
        }
        if let Some(default_value) = &self.default_value {
            dict.insert(
                keys::QUESTION_DEFAULT_VALUE.to_string(),
                default_value.to_node(),
            );
        }
        if let Some(text) = &self.text {
            dict.insert(keys::QUESTION_TEXT.to_string(), Node::String(text.clone()));
        }
        Node::Dictionary(dict)
    }

    fn from_node(node: &Node) -> Result<Self> {
        let dict = node.as_dictionary().ok_or_else(|| {
            DecodeError::invalid(keys::WORKFLOW_IMPORT_QUESTIONS, "array of dictionaries")
        })?;
        Ok(Self {
            action_index: require_int(dict, keys::QUESTION_ACTION_INDEX)?,
            parameter_key: require_string(dict, keys::QUESTION_PARAMETER_KEY)?,
            category: optional_string(dict, keys::QUESTION_CATEGORY)?,
            default_value: dict
                .get(keys::QUESTION_DEFAULT_VALUE)
                .map(ParameterValue::from_node)
                .transpose()?,
            text: optional_string(dict, keys::QUESTION_TEXT)?,
        })
    }
}

/// Version fields stamped on every shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientVersion {
    pub minimum_client_version: i64,
    pub minimum_client_version_string: String,
    pub client_version: String,
    pub client_release: Option<String>,
}

impl Default for ClientVersion {
    fn default() -> Self {
        Self {
            minimum_client_version: DEFAULT_MINIMUM_CLIENT_VERSION,
            minimum_client_version_string: DEFAULT_MINIMUM_CLIENT_VERSION.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            client_release: None,
        }
    }
}

/// The top-level automation document.
#[derive(Debug, Clone, PartialEq)]
pub struct Shortcut {
    pub name: String,
    pub actions: Vec<Action>,
    pub icon: Icon,
    pub input_content_item_classes: Vec<String>,
    pub types: Vec<String>,
    pub import_questions: Option<Vec<ImportQuestion>>,
    pub version: ClientVersion,
}

impl Shortcut {
    pub fn builder(name: impl Into<String>) -> ShortcutBuilder {
        ShortcutBuilder::new(name)
    }

    pub fn to_node(&self) -> Node {
        let mut dict = Dictionary::new();
        dict.insert(
            keys::WORKFLOW_NAME.to_string(),
            Node::String(self.name.clone()),
        );
        dict.insert(keys::WORKFLOW_ICON.to_string(), self.icon.to_node());
        dict.insert(
            keys::WORKFLOW_INPUT_CONTENT_ITEM_CLASSES.to_string(),
            string_list(&self.input_content_item_classes),
        );
        dict.insert(keys::WORKFLOW_TYPES.to_string(), string_list(&self.types));
        if let Some(questions) = &self.import_questions {
            dict.insert(
                keys::WORKFLOW_IMPORT_QUESTIONS.to_string(),
                Node::Array(questions.iter().map(ImportQuestion::to_node).collect()),
            );
        }
        dict.insert(
            keys::WORKFLOW_ACTIONS.to_string(),
            Node::Array(self.actions.iter().map(Action::to_node).collect()),
        );
        dict.insert(
            keys::WORKFLOW_MINIMUM_CLIENT_VERSION_STRING.to_string(),
            Node::String(self.version.minimum_client_version_string.clone()),
        );
        dict.insert(
            keys::WORKFLOW_MINIMUM_CLIENT_VERSION.to_string(),
            Node::Integer(self.version.minimum_client_version.into()),
        );
        dict.insert(
            keys::WORKFLOW_CLIENT_VERSION.to_string(),
            Node::String(self.version.client_version.clone()),
        );
        if let Some(release) = &self.version.client_release {
            dict.insert(
                keys::WORKFLOW_CLIENT_RELEASE.to_string(),
                Node::String(release.clone()),
            );
        }
        Node::Dictionary(dict)
    }

    pub fn from_node(node: &Node) -> Result<Self> {
        let dict = node
            .as_dictionary()
            .ok_or_else(|| DecodeError::malformed("root node is not a dictionary"))?;

        let actions = match dict.get(keys::WORKFLOW_ACTIONS) {
            Some(Node::Array(items)) => items
                .iter()
                .map(Action::from_node)
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(DecodeError::invalid(keys::WORKFLOW_ACTIONS, "array")),
            None => return Err(DecodeError::missing(keys::WORKFLOW_ACTIONS)),
        };
        let icon = dict
            .get(keys::WORKFLOW_ICON)
            .ok_or_else(|| DecodeError::missing(keys::WORKFLOW_ICON))
            .and_then(Icon::from_node)?;
        let import_questions = match dict.get(keys::WORKFLOW_IMPORT_QUESTIONS) {
            None => None,
            Some(Node::Array(items)) => Some(
                items
                    .iter()
                    .map(ImportQuestion::from_node)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Some(_) => {
                return Err(DecodeError::invalid(
                    keys::WORKFLOW_IMPORT_QUESTIONS,
                    "array",
                ))
            }
        };

        let defaults = ClientVersion::default();
        let version = ClientVersion {
            minimum_client_version: optional_int(dict, keys::WORKFLOW_MINIMUM_CLIENT_VERSION)?
                .unwrap_or(defaults.minimum_client_version),
            minimum_client_version_string: optional_string(
                dict,
                keys::WORKFLOW_MINIMUM_CLIENT_VERSION_STRING,
            )?
            .unwrap_or(defaults.minimum_client_version_string),
            client_version: optional_string(dict, keys::WORKFLOW_CLIENT_VERSION)?
                .unwrap_or(defaults.client_version),
            client_release: optional_string(dict, keys::WORKFLOW_CLIENT_RELEASE)?,
        };

        Ok(Self {
            name: require_string(dict, keys::WORKFLOW_NAME)?,
            actions,
            icon,
            input_content_item_classes: optional_string_list(
                dict,
                keys::WORKFLOW_INPUT_CONTENT_ITEM_CLASSES,
            )?,
            types: optional_string_list(dict, keys::WORKFLOW_TYPES)?,
            import_questions,
            version,
        })
    }

    /// Serialize through the container codec. Identical shortcuts always
    /// produce identical bytes.
    pub fn encode(&self, format: ContainerFormat) -> std::result::Result<Vec<u8>, EncodeError> {
        let node = self.to_node();
        let mut bytes = Vec::new();
        match format {
            ContainerFormat::Binary => node.to_writer_binary(&mut bytes)?,
            ContainerFormat::Xml => node.to_writer_xml(&mut bytes)?,
        }
        Ok(bytes)
    }

    /// Parse either physical encoding (the codec sniffs the header).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let node = Node::from_reader(Cursor::new(bytes))
            .map_err(|err| DecodeError::malformed(err.to_string()))?;
        Self::from_node(&node)
    }

    pub fn summary(&self) -> ShortcutSummary {
        ShortcutSummary {
            name: self.name.clone(),
            action_count: self.actions.len(),
            import_question_count: self.import_questions.as_ref().map_or(0, Vec::len),
            actions: self
                .actions
                .iter()
                .enumerate()
                .map(|(index, action)| ActionSummary {
                    index,
                    identifier: action.identifier.clone(),
                    uuid: action.uuid.clone(),
                    output_name: action.output_name.clone(),
                    group_id: action.group_id.clone(),
                    parameter_keys: action.parameters.keys().cloned().collect(),
                })
                .collect(),
        }
    }

    /// Summary plus reference validation, and optionally each action's
    /// parameters as JSON in action order.
    pub fn inspect(&self, include_parameters: bool) -> InspectReport {
        let reference_error = self.validate_references().err().map(|err| err.to_string());
        let parameters = include_parameters.then(|| {
            self.actions
                .iter()
                .map(|action| {
                    serde_json::Value::Object(
                        action
                            .parameters
                            .iter()
                            .map(|(key, value)| (key.clone(), value.to_json()))
                            .collect(),
                    )
                })
                .collect()
        });
        InspectReport {
            summary: self.summary(),
            references_valid: reference_error.is_none(),
            reference_error,
            parameters,
        }
    }
}

/// Assembles a [`Shortcut`] with the default icon, input classes and versions.
#[derive(Debug, Clone)]
pub struct ShortcutBuilder {
    shortcut: Shortcut,
}

impl ShortcutBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            shortcut: Shortcut {
                name: name.into(),
                actions: Vec::new(),
                icon: Icon::default(),
                input_content_item_classes: DEFAULT_INPUT_CONTENT_ITEM_CLASSES
                    .iter()
                    .map(|s| (*s).to_string())
                    .collect(),
                types: Vec::new(),
                import_questions: None,
                version: ClientVersion::default(),
            },
        }
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.shortcut.actions.push(action);
        self
    }

    #[must_use]
    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.shortcut.actions.extend(actions);
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: Icon) -> Self {
        self.shortcut.icon = icon;
        self
    }

    #[must_use]
    pub fn input_content_item_classes(mut self, classes: Vec<String>) -> Self {
        self.shortcut.input_content_item_classes = classes;
        self
    }

    #[must_use]
    pub fn types(mut self, types: Vec<String>) -> Self {
        self.shortcut.types = types;
        self
    }

    #[must_use]
    pub fn import_question(mut self, question: ImportQuestion) -> Self {
        self.shortcut
            .import_questions
            .get_or_insert_with(Vec::new)
            .push(question);
        self
    }

    #[must_use]
    pub fn version(mut self, version: ClientVersion) -> Self {
        self.shortcut.version = version;
        self
    }

    pub fn build(self) -> Shortcut {
        self.shortcut
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionSummary {
    pub index: usize,
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub parameter_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShortcutSummary {
    pub name: String,
    pub action_count: usize,
    pub import_question_count: usize,
    pub actions: Vec<ActionSummary>,
}

/// What inspecting a decoded shortcut reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InspectReport {
    #[serde(flatten)]
    pub summary: ShortcutSummary,
    pub references_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<serde_json::Value>>,
}

fn string_list(values: &[String]) -> Node {
    Node::Array(values.iter().cloned().map(Node::String).collect())
}

fn require_string(dict: &Dictionary, key: &str) -> Result<String> {
    optional_string(dict, key)?.ok_or_else(|| DecodeError::missing(key))
}

fn optional_string(dict: &Dictionary, key: &str) -> Result<Option<String>> {
    match dict.get(key) {
        None => Ok(None),
        Some(Node::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DecodeError::invalid(key, "string")),
    }
}

fn require_int(dict: &Dictionary, key: &str) -> Result<i64> {
    optional_int(dict, key)?.ok_or_else(|| DecodeError::missing(key))
}

fn optional_int(dict: &Dictionary, key: &str) -> Result<Option<i64>> {
    match dict.get(key) {
        None => Ok(None),
        Some(node) => node
            .as_signed_integer()
            .map(Some)
            .ok_or_else(|| DecodeError::invalid(key, "integer")),
    }
}

fn optional_string_list(dict: &Dictionary, key: &str) -> Result<Vec<String>> {
    match dict.get(key) {
        None => Ok(Vec::new()),
        Some(Node::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_string()
                    .map(str::to_string)
                    .ok_or_else(|| DecodeError::invalid(key, "array of strings"))
            })
            .collect(),
        Some(_) => Err(DecodeError::invalid(key, "array of strings")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn root_with(mutate: impl FnOnce(&mut Dictionary)) -> Vec<u8> {
        let shortcut = Shortcut::builder("Sample").build();
        let mut node = shortcut.to_node();
        if let Node::Dictionary(dict) = &mut node {
            mutate(dict);
        }
        let mut bytes = Vec::new();
        node.to_writer_xml(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn builder_applies_defaults() {
        let shortcut = Shortcut::builder("Empty").build();
        assert_eq!(shortcut.icon, Icon::default());
        assert_eq!(shortcut.version.minimum_client_version, 900);
        assert_eq!(shortcut.version.minimum_client_version_string, "900");
        assert!(shortcut
            .input_content_item_classes
            .iter()
            .any(|c| c == "WFStringContentItem"));
        assert!(shortcut.import_questions.is_none());
    }

    #[test]
    fn top_level_keys_match_container_format() {
        let node = Shortcut::builder("Keys").build().to_node();
        let dict = node.as_dictionary().unwrap();
        for key in [
            "WFWorkflowName",
            "WFWorkflowIcon",
            "WFWorkflowInputContentItemClasses",
            "WFWorkflowTypes",
            "WFWorkflowActions",
            "WFWorkflowMinimumClientVersionString",
            "WFWorkflowMinimumClientVersion",
            "WFWorkflowClientVersion",
        ] {
            assert!(dict.contains_key(key), "missing {key}");
        }
        assert!(!dict.contains_key("WFWorkflowImportQuestions"));
        assert!(!dict.contains_key("WFWorkflowClientRelease"));
    }

    #[test]
    fn garbage_bytes_are_malformed() {
        let err = Shortcut::decode(b"definitely not a plist").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedContainer(_)));
    }

    #[test]
    fn non_dictionary_root_is_malformed() {
        let mut bytes = Vec::new();
        Node::Array(vec![]).to_writer_binary(&mut bytes).unwrap();
        assert!(matches!(
            Shortcut::decode(&bytes),
            Err(DecodeError::MalformedContainer(_))
        ));
    }

    #[test]
    fn missing_actions_are_reported_by_name() {
        let bytes = root_with(|dict| {
            dict.remove("WFWorkflowActions");
        });
        assert_eq!(
            Shortcut::decode(&bytes).unwrap_err(),
            DecodeError::missing("WFWorkflowActions")
        );
    }

    #[test]
    fn mistyped_name_is_reported_by_name() {
        let bytes = root_with(|dict| {
            dict.insert("WFWorkflowName".to_string(), Node::Integer(7.into()));
        });
        assert_eq!(
            Shortcut::decode(&bytes).unwrap_err(),
            DecodeError::invalid("WFWorkflowName", "string")
        );
    }

    #[test]
    fn missing_version_fields_fall_back_to_defaults() {
        let bytes = root_with(|dict| {
            dict.remove("WFWorkflowClientVersion");
            dict.remove("WFWorkflowMinimumClientVersion");
        });
        let decoded = Shortcut::decode(&bytes).unwrap();
        assert_eq!(decoded.version, ClientVersion::default());
    }

    #[test]
    fn container_format_parses_aliases() {
        assert_eq!("XML".parse::<ContainerFormat>().unwrap(), ContainerFormat::Xml);
        assert_eq!(
            "bplist".parse::<ContainerFormat>().unwrap(),
            ContainerFormat::Binary
        );
        assert!("yaml".parse::<ContainerFormat>().is_err());
    }

    #[test]
    fn inspect_reports_references_and_optional_parameters() {
        use crate::{Attachment, TokenValue};

        let valid = Shortcut::builder("Inspect")
            .action(
                Action::new("is.workflow.actions.gettext")
                    .with_uuid("A")
                    .with_parameter("WFTextActionText", "hi"),
            )
            .build();
        let report = valid.inspect(false);
        assert!(report.references_valid);
        assert_eq!(report.reference_error, None);
        assert_eq!(report.parameters, None);
        assert_eq!(report.summary, valid.summary());

        let with_parameters = valid.inspect(true);
        assert_eq!(
            with_parameters.parameters,
            Some(vec![serde_json::json!({ "WFTextActionText": "hi" })])
        );

        let dangling = Shortcut::builder("Dangling")
            .action(Action::new("is.workflow.actions.showresult").with_token(
                "Text",
                TokenValue::Reference(Attachment::action_output("MISSING", "Text")),
            ))
            .build();
        let report = dangling.inspect(false);
        assert!(!report.references_valid);
        assert!(report.reference_error.unwrap().contains("MISSING"));

        let json = serde_json::to_value(valid.inspect(false)).unwrap();
        assert_eq!(json["name"], "Inspect");
        assert_eq!(json["references_valid"], true);
        assert!(json.get("parameters").is_none());
    }
}
