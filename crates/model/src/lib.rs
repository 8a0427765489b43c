//! # Shortcut Model
//!
//! In-memory model of a Shortcut automation document and its mapping onto the
//! property-list container format.
//!
//! ## Layers
//!
//! ```text
//! ParameterValue          string | int | real | bool | data | list | map
//!     │
//!     ├──> TokenValue     literal | token string (text + U+FFFC placeholders) | bare attachment
//!     │      └─ Attachment  action output / variable / clipboard / ... + aggrandizements
//!     │
//!     ├──> Action         identifier + parameters + UUID / output name / grouping id
//!     │
//!     └──> Shortcut       actions + icon + input classes + types + import questions + versions
//!            │
//!            └──> plist::Value ──> binary or XML bytes
//! ```
//!
//! Encoding a model value never fails; decoding and reference validation do.
//!
//! ## Example
//!
//! ```rust
//! use shortcut_model::{Action, Attachment, ContainerFormat, Shortcut, TokenString, TokenValue};
//!
//! let text = Action::new("is.workflow.actions.gettext")
//!     .with_uuid("6B6B3B8B-0000-4000-8000-000000000001")
//!     .with_token("WFTextActionText", TokenValue::Literal("hello".into()));
//! let reference = Attachment::action_output("6B6B3B8B-0000-4000-8000-000000000001", "Text");
//! let show = Action::new("is.workflow.actions.showresult")
//!     .with_token("Text", TokenValue::Composite(TokenString::single(reference)));
//!
//! let shortcut = Shortcut::builder("Hello").action(text).action(show).build();
//! shortcut.validate_references().unwrap();
//! let bytes = shortcut.encode(ContainerFormat::Binary).unwrap();
//! assert_eq!(Shortcut::decode(&bytes).unwrap(), shortcut);
//! ```

mod action;
mod attachment;
mod error;
mod ids;
pub mod keys;
mod shortcut;
mod token;
mod validate;
mod value;

pub use action::Action;
pub use attachment::{Aggrandizement, Attachment, AttachmentSource};
pub use error::{DecodeError, EncodeError, Result, TokenError, ValidationError};
pub use ids::{IdSource, RandomIds, SequentialIds};
pub use shortcut::{
    ActionSummary, ClientVersion, ContainerFormat, Icon, ImportQuestion, InspectReport, Shortcut,
    ShortcutBuilder, ShortcutSummary, DEFAULT_INPUT_CONTENT_ITEM_CLASSES,
};
pub use token::{TokenRange, TokenString, TokenStringBuilder, TokenValue, PLACEHOLDER};
pub use value::ParameterValue;
