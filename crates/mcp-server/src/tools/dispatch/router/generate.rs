use super::super::{CallToolResult, Content, ShortcutService};
use crate::tools::context_doc::ContextDocBuilder;
use crate::tools::schemas::generate::{GenerateShortcutRequest, GenerateShortcutResult};
use shortcut_export::ExportOutcome;
use shortcut_model::{RandomIds, Shortcut};

use super::error::{
    attach_structured_content, export_error, invalid_request, template_error_envelope,
    tool_error_envelope,
};

/// Render the shared tail of `generate_shortcut` and `build_shortcut`.
pub(super) fn push_outcome(doc: &mut ContextDocBuilder, outcome: &ExportOutcome) {
    doc.push_note(&format!(
        "actions={} format={} bytes={}",
        outcome.action_count, outcome.format, outcome.bytes_written
    ));
    if outcome.sign_mode.is_enabled() {
        doc.push_note(&format!(
            "sign_mode={} signed={}",
            outcome.sign_mode, outcome.signed
        ));
    }
    if outcome.opened {
        doc.push_note("opened in Shortcuts");
    }
    for warning in &outcome.warnings {
        doc.push_note(&format!("warning: {warning}"));
    }
    let label = if outcome.signed { "signed" } else { "unsigned" };
    doc.push_ref(&outcome.path.display().to_string(), Some(label));
}

/// Template + parameters → validated, written `.shortcut` file.
pub(in crate::tools::dispatch) async fn generate_shortcut(
    service: &ShortcutService,
    request: GenerateShortcutRequest,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let template_name = request.template.trim().to_string();
    if template_name.is_empty() {
        return Ok(invalid_request("template must not be empty"));
    }
    let config = match service.export_config_for(&request.output) {
        Ok(config) => config,
        Err(envelope) => return Ok(tool_error_envelope(envelope)),
    };

    let state = service.state();
    let template = match state.registry.get(&template_name) {
        Ok(template) => template,
        Err(err) => return Ok(tool_error_envelope(template_error_envelope(&err, &template_name))),
    };
    let actions = match template.generate(&request.parameters, &mut RandomIds) {
        Ok(actions) => actions,
        Err(err) => return Ok(tool_error_envelope(template_error_envelope(&err, &template_name))),
    };

    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| template.display_name())
        .to_string();
    let shortcut = Shortcut::builder(name.clone()).actions(actions).build();

    let (outcome, total_generated) =
        match service.export(shortcut, config, template_name.clone()).await {
            Ok(value) => value,
            Err(err) => return Ok(export_error(&err)),
        };
    log::info!(
        "Generated '{name}' from template '{template_name}' → {}",
        outcome.path.display()
    );

    let mut doc = ContextDocBuilder::new();
    doc.push_answer(&format!("generated '{name}' from {template_name}"));
    push_outcome(&mut doc, &outcome);

    let result = GenerateShortcutResult {
        name,
        template: Some(template_name),
        outcome,
        total_generated,
    };
    Ok(attach_structured_content(
        CallToolResult::success(vec![Content::text(doc.finish())]),
        &result,
        "generate_shortcut",
    ))
}
