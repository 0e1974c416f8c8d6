//! Structural parse of an email into subject, greeting, body, and signature.
//!
//! Unlike analysis, this is advisory: when the model's answer cannot be read
//! the parser falls back to a default whose body is the whole email, so a
//! caller always gets something usable. Only a failed model call is an error.

use std::sync::Arc;

use lexreply_core::normalize;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::json::parse_model_json;
use crate::model::LanguageModel;
use crate::ModelError;

const PARSE_PROMPT: &str = "\
You are a precise email-structure extraction engine.

Parse the email below into its structural parts.
Respond ONLY with a JSON object in exactly this shape:
{
  \"subject\": string | null,
  \"greeting\": string | null,
  \"body\": string,
  \"signature_text\": string | null,
  \"sender_name\": string | null,
  \"sender_role\": string | null,
  \"questions\": [string]
}

Rules:
- The sender is the latest actual sender. In a forwarded chain this is the person who wrote \
the first non-forwarded lines.
- Body is the text between greeting and signature (everything before the signature if there is \
no greeting).
- Signature is the closing name and role block, if any.
- Extract ALL questions: numbered, unnumbered, bullets, and embedded \"whether\" questions.
- Do NOT invent values. If a field is missing, use null.";

fn build_parse_prompt(email: &str) -> String {
    format!("{PARSE_PROMPT}\n\nEMAIL TO PARSE:\n{email}")
}

/// Structural parts of an email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEmail {
    pub subject: Option<String>,
    pub greeting: Option<String>,
    pub body: String,
    pub signature_text: Option<String>,
    pub sender_name: Option<String>,
    pub sender_role: Option<String>,
    pub questions: Vec<String>,
}

impl ParsedEmail {
    /// The best-effort default: the whole email as body, nothing else known.
    pub fn fallback(email: &str) -> Self {
        Self {
            body: normalize(email),
            ..Self::default()
        }
    }
}

// Lenient wire shape; nulls and missing keys are tolerated.
#[derive(Deserialize)]
struct RawParsedEmail {
    subject: Option<String>,
    greeting: Option<String>,
    body: Option<String>,
    signature_text: Option<String>,
    sender_name: Option<String>,
    sender_role: Option<String>,
    #[serde(default)]
    questions: Option<Vec<String>>,
}

impl From<RawParsedEmail> for ParsedEmail {
    fn from(raw: RawParsedEmail) -> Self {
        Self {
            subject: raw.subject,
            greeting: raw.greeting,
            body: normalize(raw.body.as_deref()),
            signature_text: raw.signature_text,
            sender_name: raw.sender_name,
            sender_role: raw.sender_role,
            questions: raw.questions.unwrap_or_default(),
        }
    }
}

/// Splits an email into its structural parts with one model call.
#[derive(Clone)]
pub struct EmailParser {
    model: Arc<dyn LanguageModel>,
    model_name: String,
}

impl EmailParser {
    pub fn new(model: Arc<dyn LanguageModel>, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
        }
    }

    pub async fn parse(&self, email_text: &str) -> Result<ParsedEmail, ModelError> {
        let email = normalize(email_text);
        let prompt = build_parse_prompt(&email);
        let raw = self.model.generate(&self.model_name, &prompt).await?;

        let parsed = parse_model_json(raw.trim())
            .and_then(serde_json::from_value::<RawParsedEmail>)
            .map(ParsedEmail::from);

        match parsed {
            Ok(p) => {
                info!(
                    sender = p.sender_name.as_deref().unwrap_or("-"),
                    questions = p.questions.len(),
                    "email parsed"
                );
                Ok(p)
            }
            Err(e) => {
                warn!(error = %e, "unreadable parse response, using whole email as body");
                Ok(ParsedEmail::fallback(&email))
            }
        }
    }
}
