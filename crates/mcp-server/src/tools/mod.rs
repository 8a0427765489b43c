//! Shortcut MCP tool surface.
//!
//! Schemas, dispatch, and the raw action lowering live in separate submodules;
//! per-tool handlers sit under `dispatch/router`.

mod context_doc;
mod dispatch;
mod raw_actions;
mod schemas;

pub use dispatch::ShortcutService;
