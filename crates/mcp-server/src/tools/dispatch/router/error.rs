use super::super::{CallToolResult, Content};
use crate::tools::context_doc::ContextDocBuilder;
use serde::Serialize;
use serde_json::json;
use shortcut_export::ExportError;
use shortcut_model::{DecodeError, ValidationError};
use shortcut_protocol::{ErrorEnvelope, ToolNextAction};
use shortcut_templates::TemplateError;

fn render_details_value(value: &serde_json::Value, max_len: usize) -> String {
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => {
            let mut out = s.split_whitespace().collect::<Vec<_>>().join(" ");
            if out.chars().count() > max_len {
                out = out.chars().take(max_len).collect();
                out.push('…');
            }
            out
        }
        serde_json::Value::Array(values) => values
            .iter()
            .map(|v| render_details_value(v, max_len))
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Object(values) => format!("<object keys={}>", values.len()),
    }
}

fn render_details_notes(details: &serde_json::Value) -> Vec<String> {
    const MAX_LINES: usize = 8;
    const MAX_VALUE_CHARS: usize = 200;

    match details {
        serde_json::Value::Object(map) => {
            let mut entries = map.iter().collect::<Vec<_>>();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            let mut out = entries
                .iter()
                .take(MAX_LINES)
                .map(|(key, value)| {
                    format!("details.{key}={}", render_details_value(value, MAX_VALUE_CHARS))
                })
                .collect::<Vec<_>>();
            if map.len() > MAX_LINES {
                out.push(format!("details.more_keys={}", map.len() - MAX_LINES));
            }
            out
        }
        other => vec![format!("details={}", render_details_value(other, 400))],
    }
}

/// Tool-level error: text document for humans, `{"error": envelope}` as
/// structured content for agents.
pub(in crate::tools::dispatch) fn tool_error_envelope(error: ErrorEnvelope) -> CallToolResult {
    let mut doc = ContextDocBuilder::new();
    doc.push_answer(&format!("error: {}", error.code));
    doc.push_note(&error.message);
    if let Some(hint) = error.hint.as_deref() {
        if !hint.trim().is_empty() {
            doc.push_note(&format!("hint: {hint}"));
        }
    }
    if let Some(details) = error.details.as_ref() {
        for line in render_details_notes(details) {
            doc.push_note(&line);
        }
    }
    for action in &error.next_actions {
        doc.push_note(&format!("next: {} ({})", action.tool, action.reason));
    }

    let mut result = CallToolResult::error(vec![Content::text(doc.finish())]);
    result.structured_content = Some(json!({ "error": error }));
    result
}

pub(in crate::tools::dispatch) fn tool_error(
    code: &'static str,
    message: impl Into<String>,
) -> CallToolResult {
    tool_error_envelope(ErrorEnvelope::new(code, message))
}

pub(in crate::tools::dispatch) fn invalid_request(message: impl Into<String>) -> CallToolResult {
    tool_error("invalid_request", message)
}

pub(in crate::tools::dispatch) fn internal_error(message: impl Into<String>) -> CallToolResult {
    tool_error("internal", message)
}

pub(in crate::tools::dispatch) fn attach_structured_content<T: Serialize>(
    mut result: CallToolResult,
    payload: &T,
    tool: &'static str,
) -> CallToolResult {
    match serde_json::to_value(payload) {
        Ok(value) => {
            result.structured_content = Some(value);
            result
        }
        Err(err) => internal_error(format!(
            "Error: failed to serialize {tool} structured_content ({err})"
        )),
    }
}

fn list_templates_action() -> ToolNextAction {
    ToolNextAction {
        tool: "list_templates".to_string(),
        args: json!({}),
        reason: "See which templates exist.".to_string(),
    }
}

fn describe_template_action(template: &str) -> ToolNextAction {
    ToolNextAction {
        tool: "describe_template".to_string(),
        args: json!({ "name": template }),
        reason: "Check parameter names, kinds and allowed values.".to_string(),
    }
}

pub(in crate::tools::dispatch) fn template_error_envelope(
    err: &TemplateError,
    template: &str,
) -> ErrorEnvelope {
    let envelope = ErrorEnvelope::new(err.code(), err.to_string());
    match err {
        TemplateError::NotFound(name) => envelope
            .with_details(json!({ "template": name }))
            .with_next_action(list_templates_action()),
        TemplateError::MissingRequiredParameter(name) => envelope
            .with_details(json!({ "template": template, "parameter": name }))
            .with_next_action(describe_template_action(template)),
        TemplateError::InvalidParameterType {
            name,
            expected,
            actual,
        } => envelope
            .with_details(json!({
                "template": template,
                "parameter": name,
                "expected": expected,
                "actual": actual,
            }))
            .with_next_action(describe_template_action(template)),
        TemplateError::InvalidChoiceValue {
            name,
            value,
            allowed,
        } => envelope
            .with_details(json!({
                "template": template,
                "parameter": name,
                "value": value,
                "allowed": allowed,
            }))
            .with_hint(format!("{name} must be one of: {}", allowed.join(", "))),
        TemplateError::GenerationFailed(_) => envelope
            .with_details(json!({ "template": template }))
            .with_next_action(describe_template_action(template)),
    }
}

pub(in crate::tools::dispatch) fn export_error(err: &ExportError) -> CallToolResult {
    let envelope = ErrorEnvelope::new(err.code(), err.to_string());
    let envelope = match err {
        ExportError::InvalidReference(ValidationError::ReservedParameter { .. }) => envelope
            .with_hint(
                "set UUID, CustomOutputName and GroupingIdentifier through id, output_name and group_id",
            ),
        ExportError::InvalidReference(_) => envelope.with_hint(
            "every ActionOutput reference must name an action that appears earlier in the list",
        ),
        _ => envelope,
    };
    tool_error_envelope(envelope)
}

pub(in crate::tools::dispatch) fn decode_error(err: &DecodeError) -> CallToolResult {
    tool_error_envelope(
        ErrorEnvelope::new("decode_failed", err.to_string())
            .with_hint("expected a binary or XML property list written by Shortcuts"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_are_rendered_sorted_and_bounded() {
        let notes = render_details_notes(&json!({
            "b": "two   words",
            "a": [1, 2],
            "c": { "nested": true },
        }));
        assert_eq!(
            notes,
            vec![
                "details.a=1, 2".to_string(),
                "details.b=two words".to_string(),
                "details.c=<object keys=1>".to_string(),
            ]
        );
    }

    #[test]
    fn choice_errors_carry_allowed_values() {
        let err = TemplateError::InvalidChoiceValue {
            name: "method".into(),
            value: "INVALID".into(),
            allowed: vec!["GET".into(), "POST".into()],
        };
        let envelope = template_error_envelope(&err, "api-request");
        assert_eq!(envelope.code, "invalid_choice");
        assert_eq!(
            envelope.details.as_ref().unwrap()["allowed"],
            json!(["GET", "POST"])
        );
        assert_eq!(envelope.hint.as_deref(), Some("method must be one of: GET, POST"));
    }

    #[test]
    fn reserved_parameter_export_errors_are_request_errors() {
        let err = ExportError::from(ValidationError::ReservedParameter {
            action_index: 2,
            key: "GroupingIdentifier".into(),
        });
        let structured = export_error(&err).structured_content.unwrap();
        assert_eq!(structured["error"]["code"], "invalid_request");
        assert!(structured["error"]["hint"]
            .as_str()
            .unwrap()
            .contains("group_id"));
    }

    #[test]
    fn error_results_are_flagged_and_structured() {
        let result = tool_error("template_not_found", "Template not found: x");
        assert_eq!(result.is_error, Some(true));
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["error"]["code"], "template_not_found");
    }
}
