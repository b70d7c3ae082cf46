//! Transformer-powered text summarization.
//!
//! Both adapters (the CLI and the web UI) build a [`PipelineConfig`] and hand it
//! to a [`Summarizer`], which owns the process-wide [`ModelCache`].

pub mod cli;
pub mod domain;
pub mod error;
pub mod eval;
pub mod infra;
pub mod llm;
pub mod prompts;
pub mod web;

pub use domain::{ModelDescriptor, PipelineConfig, SummaryResult};
pub use error::{SummarizeError, SummarizeResult};
pub use llm::{Generator, ModelCache, ModelLoader, ModelRegistry, Summarizer};
