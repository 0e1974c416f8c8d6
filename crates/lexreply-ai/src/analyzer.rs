//! Schema-validated extraction of a legal email into an [`Analysis`].
//!
//! One model call per email. The response is parsed as JSON (with the
//! brace-span fallback from [`crate::json`]), validated against the analysis
//! shape, and canonicalised. Extraction never degrades to a guessed default:
//! drafting depends on it, so any failure is surfaced to the caller.

use std::sync::Arc;

use lexreply_core::{compute_urgency, normalize, Analysis};
use tracing::{debug, info};

use crate::json::parse_model_json;
use crate::model::LanguageModel;
use crate::{AnalyzeError, ExtractionError};

const ANALYSIS_PROMPT: &str = "\
You are a legal email analysis engine.

Extract structured information from the email below.
Respond ONLY with a JSON object. No markdown fences, no explanation, just raw JSON in exactly this shape:
{
  \"intent\": \"string\",
  \"primary_topic\": \"string\",
  \"parties\": {
    \"client\": \"string or null\",
    \"counterparty\": \"string or null\"
  },
  \"agreement_reference\": {
    \"type\": \"string or null\",
    \"date\": \"ISO date string (YYYY-MM-DD) or null\"
  },
  \"questions\": [\"every legal question asked\"],
  \"requested_due_date\": \"ISO date string (YYYY-MM-DD) or null\",
  \"urgency_level\": \"low | medium | high\"
}

Rules:
- Convert every date to ISO 8601 (YYYY-MM-DD).
- Give client and counterparty names only: no honorifics, no nicknames, no quotation marks.
- Extract ALL legal questions, including:
  * bullet points
  * \"whether\" statements
  * implicit questions
  * questions spanning several lines
- If urgency is implied by phrases such as \"tomorrow\", \"end of day\", \"ASAP\", or \"before noon\", \
set urgency_level to \"high\".
- Do NOT invent values. If unsure, use null.
- Output JSON only.";

fn build_analysis_prompt(email: &str) -> String {
    format!("{ANALYSIS_PROMPT}\n\nEmail:\n{email}")
}

/// Extracts an [`Analysis`] from email text with a single model call.
#[derive(Clone)]
pub struct Analyzer {
    model: Arc<dyn LanguageModel>,
    model_name: String,
    urgency_backstop: bool,
}

impl Analyzer {
    pub fn new(model: Arc<dyn LanguageModel>, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
            urgency_backstop: true,
        }
    }

    /// Enable or disable the due-date urgency backstop (enabled by default).
    ///
    /// When enabled and the analysis carries a `requested_due_date`, the
    /// model's urgency is raised to the deterministic level if that is
    /// stricter. It is never lowered.
    pub fn with_urgency_backstop(mut self, enabled: bool) -> Self {
        self.urgency_backstop = enabled;
        self
    }

    pub async fn analyze(&self, email_text: &str) -> Result<Analysis, AnalyzeError> {
        let email = normalize(email_text);
        let prompt = build_analysis_prompt(&email);

        let raw = self.model.generate(&self.model_name, &prompt).await?;
        let mut analysis = extract_analysis(&raw)?;

        if self.urgency_backstop {
            analysis = apply_urgency_backstop(analysis);
        }

        info!(
            intent = %analysis.intent,
            questions = analysis.questions.len(),
            urgency = %analysis.urgency_level,
            "email analysed"
        );
        Ok(analysis)
    }
}

/// Turn raw model output into a validated [`Analysis`].
///
/// Distinguishes text that is not JSON at all from JSON of the wrong shape;
/// both errors carry the raw text.
pub fn extract_analysis(raw: &str) -> Result<Analysis, ExtractionError> {
    let raw = raw.trim();
    let value = parse_model_json(raw).map_err(|source| ExtractionError::JsonParse {
        raw: raw.to_string(),
        source,
    })?;
    Analysis::from_value(value).map_err(|source| ExtractionError::SchemaValidation {
        raw: raw.to_string(),
        source,
    })
}

fn apply_urgency_backstop(mut analysis: Analysis) -> Analysis {
    if analysis.requested_due_date.is_none() {
        return analysis;
    }
    let computed = compute_urgency(analysis.requested_due_date.as_deref());
    if computed > analysis.urgency_level {
        debug!(
            model = %analysis.urgency_level,
            computed = %computed,
            "due date raises urgency"
        );
        analysis.urgency_level = computed;
    }
    analysis
}
