//! Scripted [`LanguageModel`] double for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::model::LanguageModel;
use crate::ModelError;

/// Replays canned replies in order and records every call.
///
/// Once the script runs out, further calls fail with `EmptyResponse`.
pub(crate) struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    pub(crate) fn new(replies: Vec<Result<String, ModelError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn replying(texts: &[&str]) -> Arc<Self> {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub(crate) fn failing() -> Arc<Self> {
        Self::new(vec![Err(ModelError::Server {
            status: 503,
            body: "overloaded".into(),
        })])
    }

    /// Prompts received so far, in call order.
    pub(crate) fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }

    /// Model names received so far, in call order.
    pub(crate) fn model_names(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ModelError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ModelError::EmptyResponse))
    }
}
