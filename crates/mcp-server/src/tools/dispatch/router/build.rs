use super::super::{CallToolResult, Content, ShortcutService};
use crate::tools::context_doc::ContextDocBuilder;
use crate::tools::raw_actions::{lower_raw_actions, RawActionError};
use crate::tools::schemas::build::BuildShortcutRequest;
use crate::tools::schemas::generate::GenerateShortcutResult;
use serde_json::json;
use shortcut_model::{RandomIds, Shortcut};
use shortcut_protocol::ErrorEnvelope;

use super::error::{
    attach_structured_content, export_error, invalid_request, tool_error_envelope,
};

/// Stats bucket for shortcuts built from explicit action lists.
const RAW_SOURCE: &str = "raw";

fn raw_action_error(err: &RawActionError) -> CallToolResult {
    let mut envelope = ErrorEnvelope::new(err.code(), err.to_string());
    match err {
        RawActionError::UnknownReference { reference, .. } => {
            envelope = envelope
                .with_details(json!({ "reference": reference }))
                .with_hint("set \"id\" on the referenced action and use the same label in $ref");
        }
        RawActionError::DuplicateId { id, .. } => {
            envelope = envelope.with_details(json!({ "id": id }));
        }
        RawActionError::EmptyIdentifier { .. } | RawActionError::InvalidValue { .. } => {}
    }
    tool_error_envelope(envelope)
}

/// Explicit action list → validated, written `.shortcut` file.
pub(in crate::tools::dispatch) async fn build_shortcut(
    service: &ShortcutService,
    request: BuildShortcutRequest,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Ok(invalid_request("name must not be empty"));
    }
    if request.actions.is_empty() {
        return Ok(invalid_request("at least one action is required"));
    }
    let config = match service.export_config_for(&request.output) {
        Ok(config) => config,
        Err(envelope) => return Ok(tool_error_envelope(envelope)),
    };

    let actions = match lower_raw_actions(&request.actions, &mut RandomIds) {
        Ok(actions) => actions,
        Err(err) => return Ok(raw_action_error(&err)),
    };
    let shortcut = Shortcut::builder(name.clone()).actions(actions).build();

    let (outcome, total_generated) =
        match service.export(shortcut, config, RAW_SOURCE.to_string()).await {
            Ok(value) => value,
            Err(err) => return Ok(export_error(&err)),
        };
    log::info!(
        "Built '{name}' from {} raw action(s) → {}",
        request.actions.len(),
        outcome.path.display()
    );

    let mut doc = ContextDocBuilder::new();
    doc.push_answer(&format!("built '{name}'"));
    super::generate::push_outcome(&mut doc, &outcome);

    let result = GenerateShortcutResult {
        name,
        template: None,
        outcome,
        total_generated,
    };
    Ok(attach_structured_content(
        CallToolResult::success(vec![Content::text(doc.finish())]),
        &result,
        "build_shortcut",
    ))
}
