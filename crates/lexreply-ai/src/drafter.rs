//! Clause-constrained reply drafting.
//!
//! The drafter hands the model the validated analysis, the original email,
//! and the full clause block, and returns the model's prose after
//! normalisation. The output is free text: nothing here parses it, and the
//! disclaimer sentence is a prompt contract the model must honour, never
//! something inserted after the fact.

use std::sync::Arc;

use lexreply_core::{normalize, Analysis, ClauseSet};
use tracing::info;

use crate::model::LanguageModel;
use crate::ModelError;

/// Sentence the reply must use when a question needs a clause outside the set.
pub const DISCLAIMER: &str =
    "Based on the provided excerpt, this clause is not included, so we cannot confirm.";

fn build_draft_prompt(analysis: &Analysis, clauses: &ClauseSet, original_email: &str) -> String {
    let clause_block = clauses.render_block();
    let analysis_json =
        serde_json::to_string_pretty(analysis).unwrap_or_else(|_| format!("{analysis:#?}"));

    format!(
        "You are a senior commercial contracts lawyer.\n\
         \n\
         Write a reply to the email below that:\n\
         - Uses a professional legal tone.\n\
         - Addresses the sender by name.\n\
         - Answers EVERY question listed in the structured analysis, in the order given.\n\
         - Relies ONLY on these clauses (do not add others):\n\
         {clause_block}\n\
         - If the clause needed to answer a question is NOT in this list, you MUST write:\n\
         \"{DISCLAIMER}\"\n\
         - NEVER invent or infer clauses.\n\
         - NEVER reference clauses that are not in the list above.\n\
         - NEVER declare a breach unless a listed clause explicitly defines one.\n\
         - Do NOT output JSON.\n\
         \n\
         ORIGINAL EMAIL:\n\
         {original_email}\n\
         \n\
         STRUCTURED ANALYSIS:\n\
         {analysis_json}\n\
         \n\
         --- DRAFT THE REPLY BELOW THIS LINE ONLY ---"
    )
}

/// Drafts a reply grounded only in the supplied clauses.
#[derive(Clone)]
pub struct Drafter {
    model: Arc<dyn LanguageModel>,
    model_name: String,
}

impl Drafter {
    pub fn new(model: Arc<dyn LanguageModel>, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
        }
    }

    /// Draft a reply with one model call.
    ///
    /// `original_email` is embedded as given so the model sees the sender's
    /// own sign-off and formatting.
    pub async fn draft(
        &self,
        analysis: &Analysis,
        clauses: &ClauseSet,
        original_email: &str,
    ) -> Result<String, ModelError> {
        let prompt = build_draft_prompt(analysis, clauses, original_email);
        let reply = self.model.generate(&self.model_name, &prompt).await?;
        let draft = normalize(reply.as_str());
        info!(
            clauses = clauses.len(),
            questions = analysis.questions.len(),
            draft_chars = draft.len(),
            "reply drafted"
        );
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;
    use lexreply_core::{ClauseRepository, Parties, UrgencyLevel};

    fn analysis() -> Analysis {
        Analysis {
            intent: "confirm termination".into(),
            primary_topic: "termination".into(),
            parties: Parties {
                client: Some("Raj".into()),
                counterparty: None,
            },
            agreement_reference: Default::default(),
            questions: vec![
                "Can we terminate tomorrow?".into(),
                "Does clause 14.3 allow a refund?".into(),
            ],
            requested_due_date: None,
            urgency_level: UrgencyLevel::High,
        }
    }

    #[test]
    fn prompt_embeds_clauses_email_analysis_and_disclaimer() {
        let clauses = ClauseRepository::standard().all_clauses();
        let email = "Hi,\r\n\r\nplease confirm if you can terminate tomorrow.\r\n- Raj  ";
        let prompt = build_draft_prompt(&analysis(), &clauses, email);

        assert!(prompt.contains(&clauses.render_block()));
        assert!(prompt.contains(&format!("\"{DISCLAIMER}\"")));
        assert!(prompt.contains("Addresses the sender by name."));
        assert!(prompt.contains("NEVER declare a breach"));
        assert!(prompt.contains("Do NOT output JSON."));
        // Original email goes in untouched.
        assert!(prompt.contains(email));
        assert!(prompt.contains("\"Does clause 14.3 allow a refund?\""));
        assert!(prompt.contains("\"urgency_level\": \"high\""));
    }

    #[test]
    fn clause_lines_appear_in_repository_order() {
        let clauses = ClauseRepository::standard().all_clauses();
        let prompt = build_draft_prompt(&analysis(), &clauses, "Hi");
        let positions: Vec<usize> = ["9.1: ", "9.2: ", "10.1: ", "10.2: "]
            .iter()
            .map(|id| prompt.find(id).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn output_is_normalised_and_not_post_processed() {
        let model = ScriptedModel::replying(&["  Dear Raj,\r\n\r\n\r\nYes.   \r\n\r\nRegards  \n"]);
        let drafter = Drafter::new(model.clone(), "gemini-2.5-flash");
        let clauses = ClauseRepository::standard().all_clauses();
        let draft = drafter.draft(&analysis(), &clauses, "Hi").await.unwrap();

        assert_eq!(draft, "Dear Raj,\n\nYes.\n\nRegards");
        assert!(!draft.contains(DISCLAIMER));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn model_failure_propagates() {
        let drafter = Drafter::new(ScriptedModel::failing(), "m");
        let clauses = ClauseRepository::standard().all_clauses();
        let err = drafter.draft(&analysis(), &clauses, "Hi").await.unwrap_err();
        assert!(matches!(err, ModelError::Server { status: 503, .. }));
    }
}
