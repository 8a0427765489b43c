use super::super::{CallToolResult, Content, ShortcutService};
use crate::tools::context_doc::ContextDocBuilder;
use crate::tools::schemas::capabilities::{CapabilitiesRequest, CapabilitiesResult};
use serde_json::json;
use shortcut_model::ClientVersion;
use shortcut_protocol::{
    Capabilities, CapabilitiesServer, CapabilitiesVersions, OutputDefaults, ToolNextAction,
    CAPABILITIES_SCHEMA_VERSION,
};

use super::error::attach_structured_content;

/// Return versions, templates and output defaults for self-directed clients.
pub(in crate::tools::dispatch) async fn capabilities(
    service: &ShortcutService,
    _request: CapabilitiesRequest,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = service.state();
    let client = ClientVersion::default();
    let templates = state.registry.names();

    let start_route = ToolNextAction {
        tool: "list_templates".to_string(),
        args: json!({}),
        reason: "Pick a template, then describe_template before generate_shortcut.".to_string(),
    };

    let output = Capabilities {
        schema_version: CAPABILITIES_SCHEMA_VERSION,
        server: CapabilitiesServer {
            name: "shortcut-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        versions: CapabilitiesVersions {
            mcp: "v1".to_string(),
            minimum_client_version: client.minimum_client_version,
            client_version: client.client_version,
        },
        templates,
        output_defaults: OutputDefaults {
            format: state.config.format.to_string(),
            sign_mode: state.config.sign_mode.to_string(),
            output_dir: state.config.output_dir.display().to_string(),
            open_after_write: state.config.open_after_write,
        },
        start_route,
    };

    let mut doc = ContextDocBuilder::new();
    doc.push_answer("capabilities: templates + output defaults + start route");
    doc.push_note(&format!("server: shortcut-mcp {}", env!("CARGO_PKG_VERSION")));
    doc.push_note(&format!(
        "versions: mcp={} minimum_client_version={} client_version={}",
        output.versions.mcp, output.versions.minimum_client_version, output.versions.client_version
    ));
    doc.push_note(&format!("templates: {}", output.templates.join(", ")));
    doc.push_note(&format!(
        "output: format={} sign_mode={} open_after_write={}",
        output.output_defaults.format,
        output.output_defaults.sign_mode,
        output.output_defaults.open_after_write
    ));
    doc.push_ref(&output.output_defaults.output_dir, Some("output_dir"));
    doc.push_note(&format!(
        "start_route: {} ({})",
        output.start_route.tool, output.start_route.reason
    ));

    let result = CapabilitiesResult {
        capabilities: output,
    };
    Ok(attach_structured_content(
        CallToolResult::success(vec![Content::text(doc.finish())]),
        &result,
        "capabilities",
    ))
}
