use thiserror::Error;

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Caller-recoverable template failures: fix the parameters and retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Missing required parameter: {0}")]
    MissingRequiredParameter(String),

    #[error("Parameter '{name}' must be {expected}, got {actual}")]
    InvalidParameterType {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid value '{value}' for '{name}' (allowed: {})", allowed.join(", "))]
    InvalidChoiceValue {
        name: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

impl TemplateError {
    pub fn generation(reason: impl Into<String>) -> Self {
        Self::GenerationFailed(reason.into())
    }

    /// Stable machine-readable code for tool envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "template_not_found",
            Self::MissingRequiredParameter(_) => "missing_parameter",
            Self::InvalidParameterType { .. } => "invalid_parameter",
            Self::InvalidChoiceValue { .. } => "invalid_choice",
            Self::GenerationFailed(_) => "generation_failed",
        }
    }
}
