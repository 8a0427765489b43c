//! Subcommand implementations. Each returns the JSON `data` of a
//! [`CommandResponse`] or an [`ErrorEnvelope`] describing what to fix.

use serde::Serialize;
use serde_json::{json, Value};
use shortcut_export::{
    write_shortcut, ExportConfig, ExportError, ExportOutcome, GenerationStats, StatsStore,
};
use shortcut_model::{RandomIds, Shortcut};
use shortcut_protocol::{ErrorEnvelope, ToolNextAction};
use shortcut_templates::{
    ParameterKind, ParameterSpec, TemplateError, TemplateInput, TemplateRegistry,
};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: CommandStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl CommandResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            status: CommandStatus::Ok,
            error: None,
            data,
        }
    }

    pub fn error(envelope: ErrorEnvelope) -> Self {
        Self {
            status: CommandStatus::Error,
            error: Some(envelope),
            data: Value::Null,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, CommandStatus::Error)
    }
}

impl From<std::result::Result<Value, ErrorEnvelope>> for CommandResponse {
    fn from(result: std::result::Result<Value, ErrorEnvelope>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(envelope) => Self::error(envelope),
        }
    }
}

pub type CommandResult = std::result::Result<Value, ErrorEnvelope>;

fn to_data<T: Serialize>(value: &T) -> CommandResult {
    serde_json::to_value(value)
        .map_err(|err| ErrorEnvelope::new("internal", format!("serialize output: {err}")))
}

fn template_error(err: &TemplateError, template: &str) -> ErrorEnvelope {
    let envelope = ErrorEnvelope::new(err.code(), err.to_string());
    match err {
        TemplateError::NotFound(_) => envelope.with_next_action(ToolNextAction {
            tool: "templates".to_string(),
            args: json!({}),
            reason: "List available templates.".to_string(),
        }),
        _ => envelope.with_next_action(ToolNextAction {
            tool: "describe".to_string(),
            args: json!({ "name": template }),
            reason: "Check parameter names, kinds and allowed values.".to_string(),
        }),
    }
}

fn export_error(err: &ExportError) -> ErrorEnvelope {
    ErrorEnvelope::new(err.code(), err.to_string())
}

/// Parse repeated `key=value` pairs. Values that parse as JSON keep their
/// JSON type (`3`, `true`, `[...]`); anything else is taken as a string.
pub fn parse_params(pairs: &[String]) -> std::result::Result<TemplateInput, ErrorEnvelope> {
    let mut input = TemplateInput::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            return Err(ErrorEnvelope::new(
                "invalid_request",
                format!("--param '{pair}' must look like key=value"),
            ));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(ErrorEnvelope::new(
                "invalid_request",
                format!("--param '{pair}' has an empty key"),
            ));
        }
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Null) | Err(_) => Value::String(raw.to_string()),
            Ok(value) => value,
        };
        if input.insert(key.to_string(), value).is_some() {
            log::debug!("--param '{key}' given more than once; the last value wins");
        }
    }
    Ok(input)
}

/// Turn JSON scalars back into the text typed on the command line for
/// parameters declared as strings, URLs or choices, so `input=2024` or
/// `method=true` reach the template as text.
fn coerce_to_schema(params: &TemplateInput, schema: &[ParameterSpec]) -> TemplateInput {
    let mut coerced = params.clone();
    for spec in schema {
        if matches!(spec.kind, ParameterKind::Number | ParameterKind::Boolean) {
            continue;
        }
        if let Some(value) = coerced.get_mut(&spec.name) {
            if matches!(value, Value::Number(_) | Value::Bool(_)) {
                *value = Value::String(value.to_string());
            }
        }
    }
    coerced
}

pub fn list_templates(registry: &TemplateRegistry) -> CommandResult {
    to_data(&json!({ "templates": registry.list_all() }))
}

pub fn describe_template(registry: &TemplateRegistry, name: &str) -> CommandResult {
    let template = registry
        .get(name.trim())
        .map_err(|err| template_error(&err, name))?;
    to_data(&template.describe())
}

#[derive(Debug, Serialize)]
struct GenerateOutput {
    name: String,
    template: String,
    #[serde(flatten)]
    outcome: ExportOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_generated: Option<u64>,
}

pub fn generate(
    registry: &TemplateRegistry,
    config: &ExportConfig,
    template_name: &str,
    params: &TemplateInput,
    name: Option<&str>,
) -> CommandResult {
    let template = registry
        .get(template_name)
        .map_err(|err| template_error(&err, template_name))?;
    let params = coerce_to_schema(params, template.parameter_schema());
    let actions = template
        .generate(&params, &mut RandomIds)
        .map_err(|err| template_error(&err, template_name))?;

    let name = name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| template.display_name())
        .to_string();
    let shortcut = Shortcut::builder(name.clone()).actions(actions).build();
    let outcome = write_shortcut(&shortcut, config).map_err(|err| export_error(&err))?;
    log::info!("Wrote {}", outcome.path.display());

    let total_generated = match StatsStore::new(&config.stats_path).record(template.name()) {
        Ok(stats) => Some(stats.total_generated),
        Err(err) => {
            log::warn!("Failed to update generation stats: {err}");
            None
        }
    };

    to_data(&GenerateOutput {
        name,
        template: template.name().to_string(),
        outcome,
        total_generated,
    })
}

pub fn inspect(path: &Path, include_parameters: bool) -> CommandResult {
    let bytes = std::fs::read(path).map_err(|err| {
        ErrorEnvelope::new("io_error", format!("read {}: {err}", path.display()))
    })?;
    let shortcut = Shortcut::decode(&bytes).map_err(|err| {
        ErrorEnvelope::new("decode_failed", err.to_string())
            .with_hint("expected a binary or XML property list written by Shortcuts")
    })?;

    to_data(&shortcut.inspect(include_parameters))
}

#[derive(Debug, Serialize)]
struct StatsOutput {
    stats_path: String,
    #[serde(flatten)]
    stats: GenerationStats,
}

pub fn stats(config: &ExportConfig) -> CommandResult {
    let store = StatsStore::new(&config.stats_path);
    let stats = store.load().map_err(|err| export_error(&err))?;
    to_data(&StatsOutput {
        stats_path: store.path().display().to_string(),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortcut_export::SignMode;
    use shortcut_model::ContainerFormat;

    fn config_in(dir: &Path) -> ExportConfig {
        ExportConfig {
            output_dir: dir.join("out"),
            format: ContainerFormat::Binary,
            sign_mode: SignMode::Off,
            open_after_write: false,
            stats_path: dir.join("stats.json"),
        }
    }

    #[test]
    fn params_keep_json_types_and_fall_back_to_strings() {
        let input = parse_params(&[
            "input=hello world".to_string(),
            "showResult=false".to_string(),
            "operations=[{\"type\":\"uppercase\"}]".to_string(),
            "note=null".to_string(),
            "expr=a=b".to_string(),
        ])
        .unwrap();
        assert_eq!(input["input"], json!("hello world"));
        assert_eq!(input["showResult"], json!(false));
        assert!(input["operations"].is_array());
        assert_eq!(input["note"], json!("null"));
        assert_eq!(input["expr"], json!("a=b"));
    }

    #[test]
    fn scalar_params_become_text_for_textual_parameters() {
        let registry = TemplateRegistry::with_builtins();
        let template = registry.get("text-pipeline").unwrap();
        let params = parse_params(&[
            "input=2024".to_string(),
            "showResult=false".to_string(),
        ])
        .unwrap();
        let coerced = coerce_to_schema(&params, template.parameter_schema());
        assert_eq!(coerced["input"], json!("2024"));
        assert_eq!(coerced["showResult"], json!(false));
    }

    #[test]
    fn numeric_text_input_generates() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let registry = TemplateRegistry::with_builtins();
        let params = parse_params(&[
            "input=2024".to_string(),
            "operations=[{\"type\":\"uppercase\"}]".to_string(),
        ])
        .unwrap();

        let data = generate(&registry, &config, "text-pipeline", &params, None).unwrap();
        assert_eq!(data["template"], "text-pipeline");
        assert_eq!(data["action_count"], 3);
    }

    #[test]
    fn params_without_separator_are_rejected() {
        let err = parse_params(&["input".to_string()]).unwrap_err();
        assert_eq!(err.code, "invalid_request");
        let err = parse_params(&["=x".to_string()]).unwrap_err();
        assert!(err.message.contains("empty key"));
    }

    #[test]
    fn unknown_template_points_at_listing() {
        let registry = TemplateRegistry::with_builtins();
        let err = describe_template(&registry, "nope").unwrap_err();
        assert_eq!(err.code, "template_not_found");
        assert_eq!(err.next_actions[0].tool, "templates");
    }

    #[test]
    fn generate_writes_file_and_counts_it() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let registry = TemplateRegistry::with_builtins();
        let params = parse_params(&[
            "items=[\"Tea\",\"Coffee\"]".to_string(),
            "prompt=Drink?".to_string(),
        ])
        .unwrap();

        let data = generate(&registry, &config, "choose-menu", &params, None).unwrap();
        assert_eq!(data["template"], "choose-menu");
        assert_eq!(data["total_generated"], 1);
        let path = data["path"].as_str().unwrap();
        assert!(Path::new(path).exists());

        let inspected = inspect(Path::new(path), false).unwrap();
        assert_eq!(inspected["references_valid"], true);
        assert!(inspected.get("parameters").is_none());

        let stats = stats(&config).unwrap();
        assert_eq!(stats["by_template"]["choose-menu"], 1);
    }

    #[test]
    fn inspect_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.shortcut");
        std::fs::write(&path, b"not a plist").unwrap();
        let err = inspect(&path, false).unwrap_err();
        assert_eq!(err.code, "decode_failed");
    }
}
