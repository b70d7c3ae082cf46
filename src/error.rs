use thiserror::Error;

/// Errors surfaced by the summarization pipeline.
///
/// Adapters receive these unmodified and decide how to render them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SummarizeError {
    /// The request configuration broke one of its constraints.
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The model identifier is not in the registry.
    #[error("Unknown model: '{0}'. Run 'briefly models' to see available models.")]
    UnknownModel(String),

    /// Loading the model failed. Nothing was cached, so calling again retries.
    #[error("Failed to load model '{model}': {reason}")]
    ModelLoad { model: String, reason: String },

    /// Generation failed for this request only.
    #[error("Generation failed on '{model}': {reason}")]
    Generation { model: String, reason: String },
}

pub type SummarizeResult<T> = Result<T, SummarizeError>;

impl SummarizeError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn model_load(model: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::ModelLoad {
            model: model.into(),
            reason: reason.to_string(),
        }
    }

    pub fn generation(model: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Generation {
            model: model.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable label used in JSON responses and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::UnknownModel(_) => "unknown_model_error",
            Self::ModelLoad { .. } => "model_load_error",
            Self::Generation { .. } => "generation_error",
        }
    }

    /// Only load failures are worth re-invoking; everything else fails the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ModelLoad { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_model_load_is_retryable() {
        assert!(SummarizeError::model_load("t5", "timeout").is_retryable());
        assert!(!SummarizeError::validation("text", "empty").is_retryable());
        assert!(!SummarizeError::UnknownModel("gpt".into()).is_retryable());
        assert!(!SummarizeError::generation("t5", "oom").is_retryable());
    }

    #[test]
    fn validation_message_names_the_field() {
        let err = SummarizeError::validation("min_length", "must not exceed max_length (60)");
        assert_eq!(
            err.to_string(),
            "Invalid min_length: must not exceed max_length (60)"
        );
        assert_eq!(err.kind(), "validation_error");
    }
}
