//! Model-backed command proposer: one request, one candidate command.

use crate::gate::{CommandProposer, GateError};
use crate::prompts::COMMAND_SYSTEM_PROMPT;
use async_trait::async_trait;
use kaia_policy::{sanitize_proposal, CommandPolicy};
use kaia_providers::{ChatMessage, ChatModel, ModelResolver};
use std::sync::Arc;
use tracing::debug;

pub struct ModelCommandProposer {
    backend: Arc<dyn ChatModel>,
    resolver: Arc<ModelResolver>,
    preferred_model: String,
    fallback_model: Option<String>,
    policy: CommandPolicy,
}

impl ModelCommandProposer {
    pub fn new(
        backend: Arc<dyn ChatModel>,
        resolver: Arc<ModelResolver>,
        preferred_model: impl Into<String>,
        fallback_model: Option<String>,
        policy: CommandPolicy,
    ) -> Self {
        Self {
            backend,
            resolver,
            preferred_model: preferred_model.into(),
            fallback_model,
            policy,
        }
    }
}

#[async_trait]
impl CommandProposer for ModelCommandProposer {
    async fn propose(&self, request: &str) -> Result<String, GateError> {
        let model = self
            .resolver
            .resolve(
                &*self.backend,
                &self.preferred_model,
                self.fallback_model.as_deref(),
            )
            .await
            .map_err(|e| GateError::Proposal(e.to_string()))?;

        let messages = [
            ChatMessage::system(COMMAND_SYSTEM_PROMPT),
            ChatMessage::user(request),
        ];

        let raw = self
            .backend
            .chat(&model, &messages, false)
            .await
            .map_err(|e| GateError::Proposal(e.to_string()))?;

        debug!(raw, "raw command from model");

        let candidate = sanitize_proposal(&raw);
        debug!(candidate, "sanitized candidate");

        self.policy
            .vet(&candidate)
            .map_err(|e| GateError::Proposal(e.to_string()))?;

        Ok(candidate)
    }
}
