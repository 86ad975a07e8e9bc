//! Knowledge backend: `answer(query) -> text`.
//!
//! Indexing, embedding, and vector storage belong to external services.
//! This module only assembles the prompt (persona system prompt plus a
//! bounded conversation transcript) and delegates to the chat backend.

use crate::resolve::ModelResolver;
use crate::traits::{ChatMessage, ChatModel, ProviderError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[async_trait]
pub trait KnowledgeBackend: Send + Sync {
    async fn answer(&self, query: &str) -> Result<String, ProviderError>;
}

/// Rolling window of conversation turns, bounded by a character budget.
/// Oldest turns are dropped first; the system prompt is never part of the
/// buffer.
pub struct TranscriptBuffer {
    turns: VecDeque<ChatMessage>,
    char_budget: usize,
}

impl TranscriptBuffer {
    pub fn new(char_budget: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            char_budget,
        }
    }

    pub fn push(&mut self, turn: ChatMessage) {
        self.turns.push_back(turn);
        self.trim();
    }

    pub fn turns(&self) -> impl Iterator<Item = &ChatMessage> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn total_chars(&self) -> usize {
        self.turns.iter().map(|t| t.content.len()).sum()
    }

    fn trim(&mut self) {
        while self.total_chars() > self.char_budget && self.turns.len() > 1 {
            self.turns.pop_front();
        }
    }
}

pub struct ChatKnowledge {
    backend: Arc<dyn ChatModel>,
    resolver: Arc<ModelResolver>,
    preferred_model: String,
    fallback_model: Option<String>,
    system_prompt: String,
    transcript: Mutex<TranscriptBuffer>,
}

impl ChatKnowledge {
    pub fn new(
        backend: Arc<dyn ChatModel>,
        resolver: Arc<ModelResolver>,
        preferred_model: impl Into<String>,
        fallback_model: Option<String>,
        system_prompt: impl Into<String>,
        transcript_char_budget: usize,
    ) -> Self {
        Self {
            backend,
            resolver,
            preferred_model: preferred_model.into(),
            fallback_model,
            system_prompt: system_prompt.into(),
            transcript: Mutex::new(TranscriptBuffer::new(transcript_char_budget)),
        }
    }

    fn build_messages(&self, query: &str) -> Vec<ChatMessage> {
        let transcript = self.transcript.lock();
        let mut messages = Vec::with_capacity(transcript.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(transcript.turns().cloned());
        messages.push(ChatMessage::user(query));
        messages
    }
}

#[async_trait]
impl KnowledgeBackend for ChatKnowledge {
    async fn answer(&self, query: &str) -> Result<String, ProviderError> {
        let model = self
            .resolver
            .resolve(
                &*self.backend,
                &self.preferred_model,
                self.fallback_model.as_deref(),
            )
            .await?;

        let messages = self.build_messages(query);
        let reply = self.backend.chat(&model, &messages, false).await?;

        let mut transcript = self.transcript.lock();
        transcript.push(ChatMessage::user(query));
        transcript.push(ChatMessage::assistant(reply.clone()));

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_keeps_recent_turns_within_budget() {
        let mut buffer = TranscriptBuffer::new(10);
        buffer.push(ChatMessage::user("aaaa"));
        buffer.push(ChatMessage::assistant("bbbb"));
        buffer.push(ChatMessage::user("cccc"));
        // 12 chars total, oldest turn dropped.
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.turns().next().unwrap().content, "bbbb");
    }

    #[test]
    fn transcript_never_drops_the_last_turn() {
        let mut buffer = TranscriptBuffer::new(4);
        buffer.push(ChatMessage::user("0123456789"));
        assert_eq!(buffer.len(), 1);
    }

    struct EchoBackend;

    #[async_trait]
    impl ChatModel for EchoBackend {
        async fn chat(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            _json_mode: bool,
        ) -> Result<String, ProviderError> {
            Ok(format!("echo:{}", messages.last().unwrap().content))
        }

        async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
            Ok(vec!["mistral:instruct".to_string()])
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn answer_records_both_sides_of_the_turn() {
        let knowledge = ChatKnowledge::new(
            Arc::new(EchoBackend),
            Arc::new(ModelResolver::new()),
            "mistral:instruct",
            None,
            "You are Kaia.",
            8192,
        );

        let reply = knowledge.answer("what is a monad?").await.unwrap();
        assert_eq!(reply, "echo:what is a monad?");

        let transcript = knowledge.transcript.lock();
        assert_eq!(transcript.len(), 2);
    }
}
