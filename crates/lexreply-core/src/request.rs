//! Request and response shapes exchanged with callers of the pipeline.
//!
//! `contract_text` is accepted for compatibility with existing clients but
//! never changes which clauses a draft may use.

use serde::{Deserialize, Serialize};

use crate::analysis::Analysis;

/// Input for an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(alias = "emailText")]
    pub email_text: String,
    #[serde(default, alias = "contractText")]
    pub contract_text: Option<String>,
}

/// Input for drafting a reply to an already-analysed email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRequest {
    #[serde(alias = "emailText")]
    pub email_text: String,
    pub analysis: Analysis,
    #[serde(alias = "contractText")]
    pub contract_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftResponse {
    pub draft: String,
}
