use thiserror::Error;

/// The model call itself failed: the model did not answer.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no API key configured for the model provider")]
    MissingApiKey,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("model response contained no text")]
    EmptyResponse,
}

/// The model answered, but not in the expected shape.
///
/// Both variants keep the raw response so an operator can diagnose the
/// failure without calling the model again.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("model did not return valid JSON: {source}")]
    JsonParse {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("model JSON failed schema validation: {source}")]
    SchemaValidation {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ExtractionError {
    /// The model's response text, as received.
    pub fn raw(&self) -> &str {
        match self {
            Self::JsonParse { raw, .. } | Self::SchemaValidation { raw, .. } => raw,
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("model invocation failed: {0}")]
    Model(#[from] ModelError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("analysis failed: {0}")]
    Analyze(#[from] AnalyzeError),
    #[error("drafting failed: {0}")]
    Draft(#[source] ModelError),
}
