use super::super::{CallToolResult, Content, ShortcutService};
use crate::tools::context_doc::ContextDocBuilder;
use crate::tools::schemas::templates::{
    DescribeTemplateRequest, DescribeTemplateResult, ListTemplatesRequest, ListTemplatesResult,
};

use shortcut_templates::ParamValue;

use super::error::{attach_structured_content, template_error_envelope, tool_error_envelope};

fn render_default(value: &ParamValue) -> String {
    match value {
        ParamValue::String(s) | ParamValue::Url(s) => format!("{s:?}"),
        ParamValue::Number(n) => n.to_string(),
        ParamValue::Boolean(b) => b.to_string(),
    }
}

pub(in crate::tools::dispatch) async fn list_templates(
    service: &ShortcutService,
    _request: ListTemplatesRequest,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let templates = service.state().registry.list_all();

    let mut doc = ContextDocBuilder::new();
    doc.push_answer(&format!("templates: {}", templates.len()));
    for template in &templates {
        let required = if template.required_parameters.is_empty() {
            "-".to_string()
        } else {
            template.required_parameters.join(", ")
        };
        doc.push_note(&format!(
            "{} ({}): {} [required: {required}]",
            template.name, template.display_name, template.description
        ));
    }

    let result = ListTemplatesResult { templates };
    Ok(attach_structured_content(
        CallToolResult::success(vec![Content::text(doc.finish())]),
        &result,
        "list_templates",
    ))
}

pub(in crate::tools::dispatch) async fn describe_template(
    service: &ShortcutService,
    request: DescribeTemplateRequest,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let name = request.name.trim();
    let template = match service.state().registry.get(name) {
        Ok(template) => template,
        Err(err) => return Ok(tool_error_envelope(template_error_envelope(&err, name))),
    };
    let description = template.describe();

    let mut doc = ContextDocBuilder::new();
    doc.push_answer(&format!(
        "{}: {} parameter(s)",
        description.name,
        description.parameters.len()
    ));
    doc.push_note(&description.description);
    for spec in &description.parameters {
        let mut line = format!("{}: {}", spec.name, spec.kind.label());
        if spec.required {
            line.push_str(" (required)");
        }
        if let Some(default) = spec.default.as_ref() {
            line.push_str(&format!(" default={}", render_default(default)));
        }
        if !spec.description.is_empty() {
            line.push_str(&format!(" :: {}", spec.description));
        }
        doc.push_note(&line);
    }

    let result = DescribeTemplateResult {
        template: description,
    };
    Ok(attach_structured_content(
        CallToolResult::success(vec![Content::text(doc.finish())]),
        &result,
        "describe_template",
    ))
}
