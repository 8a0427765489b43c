//! Shortcut MCP Server
//!
//! Generates macOS Shortcut files for AI agents via MCP protocol.
//!
//! ## Tools
//!
//! - `capabilities` - Versions, templates and output defaults
//! - `list_templates` / `describe_template` - Template catalogue and parameter schemas
//! - `generate_shortcut` - Render a template to a `.shortcut` file
//! - `build_shortcut` - Write a `.shortcut` file from an explicit action list
//! - `inspect_shortcut` - Decode and summarise an existing file
//! - `shortcut_stats` - Generation counters
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "shortcuts": {
//!       "command": "shortcut-mcp"
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use rmcp::transport::stdio;
use rmcp::ServiceExt;

mod tools;

use tools::ShortcutService;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP protocol; logs go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!("Starting Shortcut MCP server");

    let service = ShortcutService::from_env()?;
    let server = service.serve(stdio()).await?;

    server.waiting().await?;

    log::info!("Shortcut MCP server stopped");
    Ok(())
}
