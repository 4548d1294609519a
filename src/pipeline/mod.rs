pub mod generate;
pub mod orchestrator;

pub use generate::{GenerationSettings, SummaryResult};
pub use orchestrator::Summarizer;
