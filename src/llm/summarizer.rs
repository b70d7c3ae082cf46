use std::sync::Arc;
use std::time::Instant;

use crate::domain::{word_count, PipelineConfig, SummaryResult};
use crate::error::{SummarizeError, SummarizeResult};
use crate::llm::cache::ModelCache;

/// The request pipeline shared by the CLI and the web UI.
///
/// Holds no per-request state; the only shared resource is the model cache.
#[derive(Clone)]
pub struct Summarizer {
    cache: Arc<ModelCache>,
}

impl Summarizer {
    pub fn new(cache: Arc<ModelCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    pub async fn summarize(&self, config: &PipelineConfig) -> SummarizeResult<SummaryResult> {
        // Resolve first so a bad identifier is always reported as such
        let descriptor = self.cache.registry().resolve(&config.model_identifier)?;
        config.validate()?;

        let input_words = word_count(&config.text);
        tracing::debug!(
            model = %descriptor.identifier,
            input_words,
            max_length = config.max_length,
            min_length = config.min_length,
            sampling = config.sampling_enabled,
            "summarizing"
        );

        let model = self.cache.get_or_load(&descriptor.identifier).await?;
        let input = model.descriptor.prepare_input(&config.text);
        let params = config.generation_params();

        let started = Instant::now();
        let summary = model
            .generator
            .generate(&input, &params)
            .await
            .map_err(|e| {
                tracing::warn!(model = %model.descriptor.identifier, error = %e, "generation failed");
                match e {
                    SummarizeError::Generation { .. } => e,
                    other => SummarizeError::generation(&model.descriptor.identifier, other),
                }
            })?;

        let result = SummaryResult::from_texts(&config.text, summary);
        tracing::info!(
            model = %model.descriptor.identifier,
            input_words = result.input_word_count,
            output_words = result.output_word_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "summary generated"
        );

        Ok(result)
    }
}
