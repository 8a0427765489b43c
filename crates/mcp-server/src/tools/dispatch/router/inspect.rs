use super::super::{CallToolResult, Content, ShortcutService};
use crate::tools::context_doc::ContextDocBuilder;
use crate::tools::schemas::inspect::InspectShortcutRequest;
use base64::Engine as _;
use shortcut_model::Shortcut;

use super::error::{attach_structured_content, decode_error, invalid_request, tool_error};

/// Decode a `.shortcut` file and report its structure.
pub(in crate::tools::dispatch) async fn inspect_shortcut(
    _service: &ShortcutService,
    request: InspectShortcutRequest,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let (bytes, source) = match (request.path.as_deref(), request.data_base64.as_deref()) {
        (Some(path), None) => match tokio::fs::read(path).await {
            Ok(bytes) => (bytes, path.to_string()),
            Err(err) => return Ok(tool_error("io_error", format!("read {path}: {err}"))),
        },
        (None, Some(data)) => {
            match base64::engine::general_purpose::STANDARD.decode(data.trim()) {
                Ok(bytes) => (bytes, "<base64>".to_string()),
                Err(err) => return Ok(invalid_request(format!("data_base64: {err}"))),
            }
        }
        (Some(_), Some(_)) => {
            return Ok(invalid_request("pass either path or data_base64, not both"))
        }
        (None, None) => return Ok(invalid_request("path or data_base64 is required")),
    };

    let shortcut = match Shortcut::decode(&bytes) {
        Ok(shortcut) => shortcut,
        Err(err) => return Ok(decode_error(&err)),
    };
    let report = shortcut.inspect(request.include_parameters.unwrap_or(false));
    let summary = &report.summary;
    let mut doc = ContextDocBuilder::new();
    doc.push_answer(&format!(
        "'{}': {} action(s)",
        summary.name, summary.action_count
    ));
    doc.push_ref(&source, None);
    for action in &summary.actions {
        let mut line = format!("{}. {}", action.index, action.identifier);
        if let Some(uuid) = action.uuid.as_deref() {
            line.push_str(&format!(" uuid={uuid}"));
        }
        if let Some(group) = action.group_id.as_deref() {
            line.push_str(&format!(" group={group}"));
        }
        doc.push_note(&line);
    }
    match report.reference_error.as_deref() {
        None => doc.push_note("references: valid"),
        Some(message) => doc.push_note(&format!("references: invalid ({message})")),
    }

    Ok(attach_structured_content(
        CallToolResult::success(vec![Content::text(doc.finish())]),
        &report,
        "inspect_shortcut",
    ))
}
