use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{GenerationParams, ModelDescriptor};
use crate::error::SummarizeResult;

/// A loaded sequence-to-sequence model that can turn text into a summary.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Input is already prepared for the model (task prefix applied).
    async fn generate(&self, input: &str, params: &GenerationParams) -> SummarizeResult<String>;
}

/// Produces generators. Loading is the expensive step the cache guards.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self, descriptor: &ModelDescriptor) -> SummarizeResult<Arc<dyn Generator>>;
}
