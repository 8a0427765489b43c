//! Field names of the container format. These must match the consumer exactly.

pub const ACTION_IDENTIFIER: &str = "WFWorkflowActionIdentifier";
pub const ACTION_PARAMETERS: &str = "WFWorkflowActionParameters";
pub const ACTION_UUID: &str = "UUID";
pub const ACTION_CUSTOM_OUTPUT_NAME: &str = "CustomOutputName";
pub const ACTION_GROUPING_IDENTIFIER: &str = "GroupingIdentifier";

/// Parameter keys that carry an action's identity fields rather than
/// caller parameters.
pub const ACTION_RESERVED_PARAMETERS: [&str; 3] = [
    ACTION_UUID,
    ACTION_CUSTOM_OUTPUT_NAME,
    ACTION_GROUPING_IDENTIFIER,
];

pub fn is_reserved_parameter(key: &str) -> bool {
    ACTION_RESERVED_PARAMETERS.contains(&key)
}

pub const WORKFLOW_NAME: &str = "WFWorkflowName";
pub const WORKFLOW_ICON: &str = "WFWorkflowIcon";
pub const ICON_GLYPH_NUMBER: &str = "WFWorkflowIconGlyphNumber";
pub const ICON_START_COLOR: &str = "WFWorkflowIconStartColor";
pub const ICON_IMAGE_DATA: &str = "WFWorkflowIconImageData";
pub const WORKFLOW_INPUT_CONTENT_ITEM_CLASSES: &str = "WFWorkflowInputContentItemClasses";
pub const WORKFLOW_TYPES: &str = "WFWorkflowTypes";
pub const WORKFLOW_IMPORT_QUESTIONS: &str = "WFWorkflowImportQuestions";
pub const QUESTION_ACTION_INDEX: &str = "ActionIndex";
pub const QUESTION_PARAMETER_KEY: &str = "ParameterKey";
pub const QUESTION_CATEGORY: &str = "Category";
pub const QUESTION_DEFAULT_VALUE: &str = "DefaultValue";
pub const QUESTION_TEXT: &str = "Text";
pub const WORKFLOW_ACTIONS: &str = "WFWorkflowActions";
pub const WORKFLOW_MINIMUM_CLIENT_VERSION_STRING: &str = "WFWorkflowMinimumClientVersionString";
pub const WORKFLOW_MINIMUM_CLIENT_VERSION: &str = "WFWorkflowMinimumClientVersion";
pub const WORKFLOW_CLIENT_VERSION: &str = "WFWorkflowClientVersion";
pub const WORKFLOW_CLIENT_RELEASE: &str = "WFWorkflowClientRelease";

pub const TOKEN_VALUE: &str = "Value";
pub const TOKEN_SERIALIZATION_TYPE: &str = "WFSerializationType";
pub const SERIALIZATION_TOKEN_STRING: &str = "WFTextTokenString";
pub const SERIALIZATION_TOKEN_ATTACHMENT: &str = "WFTextTokenAttachment";
pub const TOKEN_STRING: &str = "string";
pub const TOKEN_ATTACHMENTS_BY_RANGE: &str = "attachmentsByRange";

pub const ATTACHMENT_TYPE: &str = "Type";
pub const ATTACHMENT_OUTPUT_UUID: &str = "OutputUUID";
pub const ATTACHMENT_OUTPUT_NAME: &str = "OutputName";
pub const ATTACHMENT_VARIABLE_NAME: &str = "VariableName";
pub const ATTACHMENT_AGGRANDIZEMENTS: &str = "Aggrandizements";

pub const AGGRANDIZEMENT_TYPE: &str = "Type";
pub const AGGRANDIZEMENT_PROPERTY_NAME: &str = "PropertyName";
pub const AGGRANDIZEMENT_COERCION_ITEM_CLASS: &str = "CoercionItemClass";
pub const AGGRANDIZEMENT_PROPERTY: &str = "WFPropertyVariableAggrandizement";
pub const AGGRANDIZEMENT_COERCION: &str = "WFCoercionVariableAggrandizement";
