//! # Shortcut Templates
//!
//! Named, parameterized generators that produce ready-made action sequences.
//!
//! ```text
//! caller JSON parameters
//!     │
//!     ├──> validate against the template's ParameterSpec list
//!     │      ├─ required entries present
//!     │      ├─ kinds match (URL heuristic for strings)
//!     │      └─ choice values in their allowed set
//!     │
//!     └──> lower: template logic emits Actions, wiring each step to the
//!          previous one through ActionOutput attachments
//! ```
//!
//! ## Example
//!
//! ```rust
//! use shortcut_model::SequentialIds;
//! use shortcut_templates::TemplateRegistry;
//!
//! let registry = TemplateRegistry::with_builtins();
//! let input = serde_json::json!({
//!     "input": "hello world",
//!     "operations": "[{\"type\": \"uppercase\"}]"
//! });
//! let actions = registry
//!     .generate("text-pipeline", input.as_object().unwrap(), &mut SequentialIds::new())
//!     .unwrap();
//! assert_eq!(actions.len(), 3);
//! ```

pub mod builtin;
mod error;
mod registry;
mod schema;
mod template;

pub use error::{Result, TemplateError};
pub use registry::TemplateRegistry;
pub use schema::{
    looks_like_url, validate_parameters, ParamValue, ParameterKind, ParameterSpec,
    ResolvedParams, TemplateInput,
};
pub use template::{Template, TemplateDescription, TemplateSummary};
