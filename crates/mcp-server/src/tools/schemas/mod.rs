//! Request and result payloads for every tool.

pub(crate) mod build;
pub(crate) mod capabilities;
pub(crate) mod generate;
pub(crate) mod inspect;
pub(crate) mod stats;
pub(crate) mod templates;

/// Per-call overrides of the server's export configuration.
#[derive(Debug, Default, Clone, serde::Deserialize, rmcp::schemars::JsonSchema)]
pub struct OutputOverrides {
    #[schemars(description = "Directory to write into (default: server output_dir)")]
    pub output_dir: Option<String>,

    #[schemars(description = "Physical encoding: 'binary' (default) or 'xml'")]
    pub format: Option<String>,

    #[schemars(description = "Signing: 'off', 'anyone', or 'people-who-know-me'")]
    pub sign_mode: Option<String>,

    #[schemars(description = "Open the written file in the Shortcuts app")]
    pub open: Option<bool>,
}
