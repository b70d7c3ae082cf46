pub mod backend;
pub mod cache;
pub mod client;
pub mod registry;
pub mod summarizer;

pub use backend::{Generator, ModelLoader};
pub use cache::{LoadedModel, ModelCache};
pub use client::{HubGenerator, HubLoader};
pub use registry::ModelRegistry;
pub use summarizer::Summarizer;
