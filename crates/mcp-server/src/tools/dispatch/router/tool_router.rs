use super::super::*;
use crate::tools::schemas::build::BuildShortcutRequest;
use crate::tools::schemas::capabilities::CapabilitiesRequest;
use crate::tools::schemas::generate::GenerateShortcutRequest;
use crate::tools::schemas::inspect::InspectShortcutRequest;
use crate::tools::schemas::stats::ShortcutStatsRequest;
use crate::tools::schemas::templates::{DescribeTemplateRequest, ListTemplatesRequest};

use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_router};

pub(in crate::tools::dispatch) fn build_tool_router() -> ToolRouter<ShortcutService> {
    ShortcutService::tool_router()
}

#[tool_router]
impl ShortcutService {
    /// Capabilities handshake (versions, templates, output defaults, start route).
    #[tool(
        description = "Return server capabilities: versions, available templates, output defaults, and the recommended first call."
    )]
    pub async fn capabilities(
        &self,
        Parameters(request): Parameters<CapabilitiesRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::capabilities::capabilities(self, request).await
    }

    /// Template catalogue.
    #[tool(description = "List available shortcut templates with their required parameters.")]
    pub async fn list_templates(
        &self,
        Parameters(request): Parameters<ListTemplatesRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::templates::list_templates(self, request).await
    }

    /// Full parameter schema of one template.
    #[tool(
        description = "Describe one template: every parameter with its kind, whether it is required, its default, and allowed choices."
    )]
    pub async fn describe_template(
        &self,
        Parameters(request): Parameters<DescribeTemplateRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::templates::describe_template(self, request).await
    }

    /// Template → .shortcut file.
    #[tool(
        description = "Generate a .shortcut file from a template and parameters. Validates parameters and action references before writing; optionally signs and opens the file."
    )]
    pub async fn generate_shortcut(
        &self,
        Parameters(request): Parameters<GenerateShortcutRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::generate::generate_shortcut(self, request).await
    }

    /// Raw action list → .shortcut file.
    #[tool(
        description = "Build a .shortcut file from an explicit action list. Reference earlier actions with {\"$ref\": \"<id>\"} and compose text with {\"$text\": [...]}."
    )]
    pub async fn build_shortcut(
        &self,
        Parameters(request): Parameters<BuildShortcutRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::build::build_shortcut(self, request).await
    }

    /// Decode an existing file.
    #[tool(
        description = "Decode a .shortcut file (binary or XML) and summarise its actions, ids, groups, and reference validity."
    )]
    pub async fn inspect_shortcut(
        &self,
        Parameters(request): Parameters<InspectShortcutRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::inspect::inspect_shortcut(self, request).await
    }

    /// Persisted generation counters.
    #[tool(description = "Return generation statistics: total shortcuts written and counts per template.")]
    pub async fn shortcut_stats(
        &self,
        Parameters(request): Parameters<ShortcutStatsRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::stats::shortcut_stats(self, request).await
    }
}
