use serde::{Deserialize, Serialize};

use crate::error::{SummarizeError, SummarizeResult};

pub const DEFAULT_MODEL: &str = "bart";
pub const DEFAULT_MAX_LENGTH: usize = 60;
pub const DEFAULT_MIN_LENGTH: usize = 20;

/// Literal prepended to the input of prefix-conditioned models (T5 family).
pub const TASK_PREFIX: &str = "summarize: ";

/// A model the pipeline knows how to dispatch to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Short name used on the CLI and in the web dropdown, e.g. `distilbart`.
    pub identifier: String,
    /// Name of the pretrained checkpoint on the model hub.
    pub canonical_name: String,
    #[serde(default)]
    pub requires_task_prefix: bool,
    #[serde(default)]
    pub description: String,
}

impl ModelDescriptor {
    pub fn new(identifier: impl Into<String>, canonical_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            canonical_name: canonical_name.into(),
            requires_task_prefix: false,
            description: String::new(),
        }
    }

    pub fn with_task_prefix(mut self) -> Self {
        self.requires_task_prefix = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Text as the model should receive it.
    pub fn prepare_input(&self, text: &str) -> String {
        if self.requires_task_prefix {
            format!("{TASK_PREFIX}{text}")
        } else {
            text.to_string()
        }
    }
}

/// One summarization request, as built by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub text: String,
    pub model_identifier: String,
    pub max_length: usize,
    pub min_length: usize,
    pub sampling_enabled: bool,
}

impl PipelineConfig {
    pub fn new(text: impl Into<String>, model_identifier: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model_identifier: model_identifier.into(),
            max_length: DEFAULT_MAX_LENGTH,
            min_length: DEFAULT_MIN_LENGTH,
            sampling_enabled: false,
        }
    }

    pub fn with_lengths(mut self, min_length: usize, max_length: usize) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    pub fn with_sampling(mut self, enabled: bool) -> Self {
        self.sampling_enabled = enabled;
        self
    }

    /// Checks text and length bounds. The model identifier is checked by the registry.
    pub fn validate(&self) -> SummarizeResult<()> {
        if self.text.trim().is_empty() {
            return Err(SummarizeError::validation("text", "input text is empty"));
        }
        if self.max_length == 0 {
            return Err(SummarizeError::validation(
                "max_length",
                "must be greater than zero",
            ));
        }
        if self.min_length > self.max_length {
            return Err(SummarizeError::validation(
                "min_length",
                format!(
                    "{} must not exceed max_length ({})",
                    self.min_length, self.max_length
                ),
            ));
        }
        Ok(())
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_length: self.max_length,
            min_length: self.min_length,
            do_sample: self.sampling_enabled,
        }
    }
}

/// Parameters handed to the generator for a single call.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct GenerationParams {
    pub max_length: usize,
    pub min_length: usize,
    /// When false the backend must decode greedily.
    pub do_sample: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryResult {
    pub summary_text: String,
    pub input_word_count: usize,
    pub output_word_count: usize,
    /// `None` only when the input had no words.
    pub compression_ratio: Option<f64>,
}

impl SummaryResult {
    pub fn from_texts(input: &str, summary: impl Into<String>) -> Self {
        let summary_text = summary.into();
        let input_word_count = word_count(input);
        let output_word_count = word_count(&summary_text);

        Self {
            summary_text,
            input_word_count,
            output_word_count,
            compression_ratio: compression_ratio(input_word_count, output_word_count),
        }
    }

    pub fn compression_percent(&self) -> Option<f64> {
        self.compression_ratio.map(|r| r * 100.0)
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// `1 - output/input`, clamped to `[0, 1]`.
pub fn compression_ratio(input_words: usize, output_words: usize) -> Option<f64> {
    if input_words == 0 {
        return None;
    }
    let ratio = 1.0 - output_words as f64 / input_words as f64;
    Some(ratio.clamp(0.0, 1.0))
}
