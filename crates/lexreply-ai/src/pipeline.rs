//! The two-step workflow: analyse, then draft.
//!
//! A fixed sequence with no branches or loops. Drafting starts only after
//! analysis has returned and validated; each step writes its output once.
//! The clause set always comes from [`ClauseRepository::standard`], whatever
//! contract text the caller supplies.

use std::sync::Arc;

use lexreply_core::{Analysis, ClauseRepository};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzer::Analyzer;
use crate::drafter::Drafter;
use crate::model::LanguageModel;
use crate::PipelineError;

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub email_text: String,
    pub contract_text: Option<String>,
    pub analysis: Analysis,
    pub draft: String,
}

/// Analyzer → Drafter.
#[derive(Clone)]
pub struct Pipeline {
    analyzer: Analyzer,
    drafter: Drafter,
    clauses: ClauseRepository,
}

impl Pipeline {
    pub fn new(analyzer: Analyzer, drafter: Drafter) -> Self {
        Self {
            analyzer,
            drafter,
            clauses: ClauseRepository::standard(),
        }
    }

    /// Build both steps over one model client.
    pub fn from_model(model: Arc<dyn LanguageModel>, model_name: &str) -> Self {
        Self::new(
            Analyzer::new(Arc::clone(&model), model_name),
            Drafter::new(model, model_name),
        )
    }

    pub fn clauses(&self) -> &ClauseRepository {
        &self.clauses
    }

    /// Run analysis then drafting for one email.
    ///
    /// `contract_text` is carried through to the result but does not affect
    /// which clauses the draft may use.
    pub async fn run(
        &self,
        email_text: impl Into<String>,
        contract_text: Option<String>,
    ) -> Result<PipelineRun, PipelineError> {
        let email_text = email_text.into();
        if contract_text.is_some() {
            debug!("contract text supplied; drafting uses the standard clause set");
        }

        info!(step = "analyze", "pipeline step starting");
        let analysis = self.analyzer.analyze(&email_text).await?;

        info!(step = "draft", "pipeline step starting");
        let clauses = self.clauses.all_clauses();
        let draft = self
            .drafter
            .draft(&analysis, &clauses, &email_text)
            .await
            .map_err(PipelineError::Draft)?;

        info!(urgency = %analysis.urgency_level, "pipeline complete");
        Ok(PipelineRun {
            email_text,
            contract_text,
            analysis,
            draft,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafter::DISCLAIMER;
    use crate::testing::ScriptedModel;
    use crate::{AnalyzeError, ModelError};
    use lexreply_core::UrgencyLevel;

    const EMAIL: &str = "Hi, please confirm if you can terminate tomorrow. — Raj";

    const ANALYSIS_REPLY: &str = r#"{
        "intent": "confirm termination",
        "primary_topic": "termination",
        "parties": {"client": "Raj", "counterparty": null},
        "agreement_reference": {"type": null, "date": null},
        "questions": ["Can you terminate tomorrow?"],
        "requested_due_date": null,
        "urgency_level": "high"
    }"#;

    const CLAUSE_9_1: &str = "Either Party may terminate this Agreement for cause upon thirty (30) days’ written notice if the other Party commits a material breach.";

    #[tokio::test]
    async fn analysis_then_draft_grounded_in_clause_9_1() {
        let draft_reply = format!(
            "Dear Raj,\n\nUnder clause 9.1: \"{CLAUSE_9_1}\" Termination tomorrow is not possible.\n\nKind regards"
        );
        let model = ScriptedModel::replying(&[ANALYSIS_REPLY, draft_reply.as_str()]);
        let pipeline = Pipeline::from_model(model.clone(), "gemini-2.5-flash");

        let run = pipeline.run(EMAIL, None).await.unwrap();

        assert_eq!(run.analysis.urgency_level, UrgencyLevel::High);
        assert!(run.analysis.questions.iter().any(|q| q.contains("terminate")));
        assert!(run.draft.contains(CLAUSE_9_1));
        assert_eq!(run.email_text, EMAIL);

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("legal email analysis engine"));
        assert!(prompts[1].contains(&format!("9.1: {CLAUSE_9_1}")));
        assert!(prompts[1].contains("Can you terminate tomorrow?"));
        assert!(prompts[1].contains(EMAIL));
    }

    #[tokio::test]
    async fn unlisted_clause_answer_carries_disclaimer_verbatim() {
        let draft_reply = format!("Dear Raj,\n\nRegarding clause 14.3: {DISCLAIMER}\n\nKind regards");
        let model = ScriptedModel::replying(&[ANALYSIS_REPLY, draft_reply.as_str()]);
        let run = Pipeline::from_model(model, "m").run(EMAIL, None).await.unwrap();
        assert!(run.draft.contains(DISCLAIMER));
    }

    #[tokio::test]
    async fn contract_text_does_not_change_clauses() {
        let model = ScriptedModel::replying(&[ANALYSIS_REPLY, "Dear Raj, noted."]);
        let pipeline = Pipeline::from_model(model.clone(), "m");
        let contract = "Clause 14.3: Refunds are available on request.".to_string();

        let run = pipeline.run(EMAIL, Some(contract.clone())).await.unwrap();

        assert_eq!(run.contract_text.as_deref(), Some(contract.as_str()));
        let draft_prompt = &model.prompts()[1];
        assert!(!draft_prompt.contains("Refunds are available"));
        assert!(draft_prompt.contains("10.2: For termination"));
    }

    #[tokio::test]
    async fn analysis_failure_stops_before_drafting() {
        let model = ScriptedModel::replying(&["no json at all", "should not be used"]);
        let pipeline = Pipeline::from_model(model.clone(), "m");
        let err = pipeline.run(EMAIL, None).await.unwrap_err();
        assert!(matches!(err, PipelineError::Analyze(AnalyzeError::Extraction(_))));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn draft_failure_is_reported_as_draft_step() {
        let model = ScriptedModel::new(vec![
            Ok(ANALYSIS_REPLY.to_string()),
            Err(ModelError::EmptyResponse),
        ]);
        let err = Pipeline::from_model(model, "m").run(EMAIL, None).await.unwrap_err();
        assert!(matches!(err, PipelineError::Draft(ModelError::EmptyResponse)));
    }

    #[test]
    fn pipeline_uses_standard_clauses() {
        let pipeline = Pipeline::from_model(ScriptedModel::replying(&[]), "m");
        let ids: Vec<&str> = pipeline.clauses().all_clauses().ids().collect();
        assert_eq!(ids, vec!["9.1", "9.2", "10.1", "10.2"]);
    }
}
