//! # Shortcut Export
//!
//! Everything that touches the outside world once a [`Shortcut`] exists:
//!
//! ```text
//! Shortcut
//!     │
//!     ├──> validate_references (dangling / forward ActionOutput links)
//!     ├──> encode (binary or XML property list)
//!     ├──> write <output_dir>/<sanitised name>.shortcut (atomic rename)
//!     ├──> sign via `shortcuts sign` (falls back to the unsigned file)
//!     └──> open in the companion app (optional)
//! ```
//!
//! Configuration is layered: defaults, then a TOML file, then `SHORTCUT_*`
//! environment variables, then whatever flags the front end applies.
//!
//! [`Shortcut`]: shortcut_model::Shortcut

mod config;
mod error;
mod open;
mod signing;
mod stats;
mod writer;

pub use config::{
    ExportConfig, ENV_CONFIG, ENV_FORMAT, ENV_OPEN, ENV_OUTPUT_DIR, ENV_SIGN_MODE,
    ENV_STATS_PATH, STATE_DIR_NAME,
};
pub use error::{ExportError, Result};
pub use open::{open_in_companion, open_with};
pub use signing::{SignMode, Signer};
pub use stats::{GenerationStats, StatsStore};
pub use writer::{
    output_path, sanitize_file_name, write_shortcut, write_shortcut_with, ExportOutcome,
};
