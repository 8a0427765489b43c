use super::OutputOverrides;
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use shortcut_export::ExportOutcome;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateShortcutRequest {
    #[schemars(description = "Template name (see list_templates)")]
    pub template: String,

    /// Loosely typed template parameters
    #[schemars(description = "Template parameters; see describe_template for names and kinds")]
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,

    #[schemars(description = "Shortcut name (default: the template's display name)")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub output: OutputOverrides,
}

#[derive(Debug, Serialize)]
pub struct GenerateShortcutResult {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(flatten)]
    pub outcome: ExportOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_generated: Option<u64>,
}
