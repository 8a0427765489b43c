//! MCP tool dispatch for the Shortcut generator.
//!
//! The service owns one template registry and one export configuration for
//! the life of the process; every tool call reads them and never mutates them.

mod router;

use super::schemas::OutputOverrides;
use anyhow::{Context as AnyhowContext, Result};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{tool_handler, ErrorData as McpError, ServerHandler};
use shortcut_export::{
    write_shortcut_with, ExportConfig, ExportError, ExportOutcome, SignMode, Signer, StatsStore,
};
use shortcut_model::{ContainerFormat, Shortcut};
use shortcut_protocol::ErrorEnvelope;
use shortcut_templates::TemplateRegistry;
use std::path::PathBuf;
use std::sync::Arc;

/// Shortcut MCP Service
#[derive(Clone)]
pub struct ShortcutService {
    /// Tool router
    tool_router: ToolRouter<Self>,
    /// Read-only state shared by every call
    state: Arc<ServiceState>,
}

pub(crate) struct ServiceState {
    pub(crate) registry: TemplateRegistry,
    pub(crate) config: ExportConfig,
    pub(crate) signer: Signer,
    pub(crate) stats: StatsStore,
}

impl ShortcutService {
    /// Service with the built-in templates and configuration from
    /// `$SHORTCUT_CONFIG` and `SHORTCUT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let config = ExportConfig::load(None).context("load export configuration")?;
        Ok(Self::with_config(TemplateRegistry::with_builtins(), config))
    }

    pub fn with_config(registry: TemplateRegistry, config: ExportConfig) -> Self {
        let stats = StatsStore::new(&config.stats_path);
        Self {
            tool_router: router::build_tool_router(),
            state: Arc::new(ServiceState {
                registry,
                config,
                signer: Signer::default(),
                stats,
            }),
        }
    }

    pub(crate) fn state(&self) -> &ServiceState {
        &self.state
    }

    /// Server configuration with the caller's per-call overrides applied.
    pub(crate) fn export_config_for(
        &self,
        overrides: &OutputOverrides,
    ) -> std::result::Result<ExportConfig, ErrorEnvelope> {
        let mut config = self.state.config.clone();
        if let Some(dir) = overrides.output_dir.as_deref().filter(|d| !d.trim().is_empty()) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(format) = overrides.format.as_deref() {
            config.format = format.parse::<ContainerFormat>().map_err(|reason| {
                ErrorEnvelope::new("invalid_request", reason).with_hint("use 'binary' or 'xml'")
            })?;
        }
        if let Some(mode) = overrides.sign_mode.as_deref() {
            config.sign_mode = mode.parse::<SignMode>().map_err(|reason| {
                ErrorEnvelope::new("invalid_request", reason)
                    .with_hint("use 'off', 'anyone' or 'people-who-know-me'")
            })?;
        }
        if let Some(open) = overrides.open {
            config.open_after_write = open;
        }
        Ok(config)
    }

    /// Write `shortcut` off the async runtime and count it under `source`.
    /// Stats failures are logged, never returned.
    pub(crate) async fn export(
        &self,
        shortcut: Shortcut,
        config: ExportConfig,
        source: String,
    ) -> std::result::Result<(ExportOutcome, Option<u64>), ExportError> {
        let state = Arc::clone(&self.state);
        let joined = tokio::task::spawn_blocking(move || {
            let outcome = write_shortcut_with(&shortcut, &config, &state.signer)?;
            let total = match state.stats.record(&source) {
                Ok(stats) => Some(stats.total_generated),
                Err(err) => {
                    log::warn!("Failed to update generation stats: {err}");
                    None
                }
            };
            Ok((outcome, total))
        })
        .await;
        match joined {
            Ok(result) => result,
            Err(err) => Err(ExportError::io(
                &self.state.config.output_dir,
                std::io::Error::other(format!("export task failed: {err}")),
            )),
        }
    }
}

#[tool_handler]
impl ServerHandler for ShortcutService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Shortcut MCP writes macOS Shortcut files. Use 'list_templates' and 'describe_template' to discover templates, 'generate_shortcut' to render one to a file, 'build_shortcut' for hand-described action lists, 'inspect_shortcut' to decode an existing file, and 'capabilities' for output defaults.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}
