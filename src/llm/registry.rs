use once_cell::sync::Lazy;

use crate::domain::ModelDescriptor;
use crate::error::{SummarizeError, SummarizeResult};

static BUILTIN_MODELS: Lazy<Vec<ModelDescriptor>> = Lazy::new(|| {
    vec![
        ModelDescriptor::new("bart", "facebook/bart-large-cnn").with_description(
            "Full-sized encoder-decoder summarization model. Highest quality; heavier and slower.",
        ),
        ModelDescriptor::new("distilbart", "sshleifer/distilbart-cnn-12-6").with_description(
            "Distilled BART. Faster and lighter, with a small trade-off in quality.",
        ),
        ModelDescriptor::new("t5", "t5-small")
            .with_task_prefix()
            .with_description("Lightweight text-to-text model. Smallest and fastest."),
    ]
});

/// Table of supported models, keyed by identifier.
///
/// Order is registration order; the web dropdown and `briefly models` list follow it.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModelRegistry {
    pub fn builtin() -> Self {
        Self {
            models: BUILTIN_MODELS.clone(),
        }
    }

    /// Adds a model, replacing any existing entry with the same identifier.
    pub fn register(&mut self, mut descriptor: ModelDescriptor) {
        descriptor.identifier = normalize(&descriptor.identifier);
        match self
            .models
            .iter_mut()
            .find(|m| m.identifier == descriptor.identifier)
        {
            Some(existing) => *existing = descriptor,
            None => self.models.push(descriptor),
        }
    }

    pub fn with_models(mut self, extra: impl IntoIterator<Item = ModelDescriptor>) -> Self {
        for descriptor in extra {
            self.register(descriptor);
        }
        self
    }

    pub fn resolve(&self, identifier: &str) -> SummarizeResult<&ModelDescriptor> {
        let key = normalize(identifier);
        self.models
            .iter()
            .find(|m| m.identifier == key)
            .ok_or_else(|| SummarizeError::UnknownModel(identifier.to_string()))
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.identifier.as_str())
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }
}

fn normalize(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}
