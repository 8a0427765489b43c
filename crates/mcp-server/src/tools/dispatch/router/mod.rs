// Per-tool dispatch functions used by the MCP tool router.

pub(super) mod build;
pub(super) mod capabilities;
pub(super) mod error;
pub(super) mod generate;
pub(super) mod inspect;
pub(super) mod stats;
pub(super) mod templates;

mod tool_router;

pub(super) use tool_router::build_tool_router;
