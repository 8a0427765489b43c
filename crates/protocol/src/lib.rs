use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const CAPABILITIES_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ToolNextAction {
    pub tool: String,
    pub args: serde_json::Value,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub hint: Option<String>,
    #[serde(default)]
    pub next_actions: Vec<ToolNextAction>,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            hint: None,
            next_actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_next_action(mut self, action: ToolNextAction) -> Self {
        self.next_actions.push(action);
        self
    }
}

/// Output defaults a client can expect when it omits the corresponding request fields.
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct OutputDefaults {
    pub format: String,
    pub sign_mode: String,
    pub output_dir: String,
    pub open_after_write: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct CapabilitiesServer {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct CapabilitiesVersions {
    pub mcp: String,
    pub minimum_client_version: i64,
    pub client_version: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct Capabilities {
    pub schema_version: u32,
    pub server: CapabilitiesServer,
    pub versions: CapabilitiesVersions,
    pub templates: Vec<String>,
    pub output_defaults: OutputDefaults,
    pub start_route: ToolNextAction,
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_serializes_empty_next_actions() {
        let envelope = ErrorEnvelope::new("invalid_request", "bad input").with_hint("retry");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["code"], "invalid_request");
        assert_eq!(value["hint"], "retry");
        assert_eq!(value["next_actions"], serde_json::json!([]));
    }

    #[test]
    fn error_envelope_deserializes_without_next_actions() {
        let raw = r#"{"code":"internal","message":"boom","details":null,"hint":null}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(raw).unwrap();
        assert!(envelope.next_actions.is_empty());
    }
}
