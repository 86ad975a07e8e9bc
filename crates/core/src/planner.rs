//! Intent classification via the model backend.

use crate::plan::ActionPlan;
use crate::prompts::{PLANNER_EXAMPLES, PLANNER_SYSTEM_PROMPT};
use kaia_providers::{ChatMessage, ChatModel, ModelResolver};
use std::sync::Arc;
use tracing::warn;

pub struct ActionPlanner {
    backend: Arc<dyn ChatModel>,
    resolver: Arc<ModelResolver>,
    preferred_model: String,
    fallback_model: Option<String>,
}

impl ActionPlanner {
    pub fn new(
        backend: Arc<dyn ChatModel>,
        resolver: Arc<ModelResolver>,
        preferred_model: impl Into<String>,
        fallback_model: Option<String>,
    ) -> Self {
        Self {
            backend,
            resolver,
            preferred_model: preferred_model.into(),
            fallback_model,
        }
    }

    fn build_messages(input: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(PLANNER_EXAMPLES.len() * 2 + 2);
        messages.push(ChatMessage::system(PLANNER_SYSTEM_PROMPT));
        for (user, assistant) in PLANNER_EXAMPLES {
            messages.push(ChatMessage::user(*user));
            messages.push(ChatMessage::assistant(*assistant));
        }
        messages.push(ChatMessage::user(input));
        messages
    }

    /// Classify a request. Never fails: invalid planner output degrades
    /// to a chat plan, an unreachable backend degrades to keyword
    /// heuristics.
    pub async fn plan(&self, input: &str) -> ActionPlan {
        let resolved = self
            .resolver
            .resolve(
                &*self.backend,
                &self.preferred_model,
                self.fallback_model.as_deref(),
            )
            .await;

        let model = match resolved {
            Ok(model) => model,
            Err(e) => {
                warn!(error = %e, "planner model unavailable, using keyword fallback");
                return ActionPlan::classify_fallback(input);
            }
        };

        match self
            .backend
            .chat(&model, &Self::build_messages(input), true)
            .await
        {
            Ok(raw) => ActionPlan::parse(&raw, input),
            Err(e) => {
                warn!(error = %e, "action plan generation failed, using keyword fallback");
                ActionPlan::classify_fallback(input)
            }
        }
    }
}
