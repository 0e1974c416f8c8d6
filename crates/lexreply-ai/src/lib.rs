//! LLM layer: schema-validated email analysis, clause-constrained drafting,
//! structural email parsing, and the analyse-then-draft pipeline.

mod error;
pub use error::{AnalyzeError, ExtractionError, ModelError, PipelineError};

pub mod analyzer;
pub mod drafter;
pub mod gemini;
pub mod json;
pub mod model;
pub mod parser;
pub mod pipeline;

#[cfg(test)]
mod testing;

pub use analyzer::{extract_analysis, Analyzer};
pub use drafter::{Drafter, DISCLAIMER};
pub use gemini::GeminiClient;
pub use model::{LanguageModel, ModelConfig};
pub use parser::{EmailParser, ParsedEmail};
pub use pipeline::{Pipeline, PipelineRun};
