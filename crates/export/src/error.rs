use shortcut_model::{EncodeError, ValidationError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Failures while turning a shortcut into a file on disk
#[derive(Error, Debug)]
pub enum ExportError {
    /// The shortcut has a reference the consumer would silently drop, or an
    /// identity key hidden in its parameter map
    #[error("Invalid reference: {0}")]
    InvalidReference(#[from] ValidationError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external signing tool could not be run or rejected the file
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The companion app could not be asked to open the file
    #[error("Open failed: {0}")]
    Open(String),

    /// The statistics file exists but is not valid JSON for the stats schema
    #[error("Statistics file {} is corrupt: {source}", path.display())]
    StatsCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("Invalid setting {key}={value}: {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_setting(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code for tool envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidReference(ValidationError::ReservedParameter { .. }) => "invalid_request",
            Self::InvalidReference(_) => "invalid_reference",
            Self::Encode(_) => "internal",
            Self::Io { .. } | Self::Signing(_) | Self::Open(_) | Self::StatsCorrupt { .. } => {
                "io_error"
            }
            Self::Config { .. } | Self::InvalidSetting { .. } => "invalid_request",
        }
    }
}
