pub mod rouge;
pub mod samples;

pub use rouge::{Evaluator, RougeScorer, RougeScores, Score};
pub use samples::{Sample, SAMPLE_DATA};
