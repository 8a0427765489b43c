use super::OutputOverrides;
use rmcp::schemars;
use serde::Deserialize;

/// One caller-described action.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct RawAction {
    #[schemars(description = "Reverse-domain action identifier, e.g. is.workflow.actions.gettext")]
    pub identifier: String,

    /// Label other actions use in `{"$ref": "<id>"}`
    #[schemars(
        description = "Optional label; other actions reference this action's output with {\"$ref\": \"<id>\"}"
    )]
    pub id: Option<String>,

    #[schemars(description = "Custom output name shown in the editor")]
    pub output_name: Option<String>,

    #[schemars(description = "Grouping identifier shared by control-flow parts (menu start/item/end)")]
    pub group_id: Option<String>,

    #[schemars(
        description = "Action parameters. Plain JSON values pass through; {\"$ref\": id} references an earlier action's output; {\"$text\": [\"literal\", {\"$ref\": id}, ...]} builds text with embedded variables; {\"$variable\": name} and {\"$magic\": \"clipboard\"|\"current_date\"|\"ask\"|\"extension_input\"} reference other sources; {\"$base64\": data} is raw bytes"
    )]
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BuildShortcutRequest {
    #[schemars(description = "Shortcut name")]
    pub name: String,

    #[schemars(description = "Actions in execution order")]
    pub actions: Vec<RawAction>,

    #[serde(flatten)]
    pub output: OutputOverrides,
}
