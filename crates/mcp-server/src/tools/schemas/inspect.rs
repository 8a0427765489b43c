use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct InspectShortcutRequest {
    #[schemars(description = "Path to a .shortcut file (binary or XML property list)")]
    pub path: Option<String>,

    #[schemars(description = "File contents as base64, instead of path")]
    pub data_base64: Option<String>,

    #[schemars(description = "Include each action's parameters as JSON (default: false)")]
    pub include_parameters: Option<bool>,
}
