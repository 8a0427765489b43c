use rmcp::schemars;
use serde::{Deserialize, Serialize};
use shortcut_templates::{TemplateDescription, TemplateSummary};

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListTemplatesRequest {}

#[derive(Debug, Serialize)]
pub struct ListTemplatesResult {
    pub templates: Vec<TemplateSummary>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DescribeTemplateRequest {
    #[schemars(description = "Template name, as returned by list_templates")]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DescribeTemplateResult {
    #[serde(flatten)]
    pub template: TemplateDescription,
}
