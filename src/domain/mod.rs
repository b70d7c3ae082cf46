pub mod request;

pub use request::{
    compression_ratio, word_count, GenerationParams, ModelDescriptor, PipelineConfig,
    SummaryResult, DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH, DEFAULT_MODEL, TASK_PREFIX,
};
