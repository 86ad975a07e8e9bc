//! Model availability resolution with a fallback chain.
//!
//! A configured model is only a preference: the daemon may not have it
//! pulled. Resolution asks the backend for its tag list and walks
//! preferred -> explicit fallback -> generic fallbacks, caching successful
//! answers for the life of the process.

use crate::traits::{ChatModel, ProviderError};
use parking_lot::Mutex;
use std::collections::HashMap;

const GENERIC_FALLBACKS: &[&str] = &["llama2:7b-chat", "mistral:instruct"];

pub struct ModelResolver {
    cache: Mutex<HashMap<(String, Option<String>), String>>,
}

impl ModelResolver {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn resolve(
        &self,
        backend: &dyn ChatModel,
        preferred: &str,
        fallback: Option<&str>,
    ) -> Result<String, ProviderError> {
        let cache_key = (preferred.to_string(), fallback.map(str::to_string));
        if let Some(cached) = self.cache.lock().get(&cache_key) {
            return Ok(cached.clone());
        }

        let available = backend.list_models().await?;

        let resolved = if available.iter().any(|m| m == preferred) {
            preferred.to_string()
        } else if let Some(name) = fallback.filter(|f| available.iter().any(|m| m == *f)) {
            tracing::warn!(
                preferred,
                fallback = name,
                "configured model not available, using fallback"
            );
            name.to_string()
        } else if let Some(name) = GENERIC_FALLBACKS
            .iter()
            .find(|f| available.iter().any(|m| m == *f))
        {
            tracing::warn!(preferred, generic = %name, "using generic fallback model");
            name.to_string()
        } else {
            return Err(ProviderError::NoModel(format!(
                "none of '{}', fallback {:?}, or generics {:?} are served (available: {:?})",
                preferred, fallback, GENERIC_FALLBACKS, available
            )));
        };

        self.cache.lock().insert(cache_key, resolved.clone());
        Ok(resolved)
    }
}

impl Default for ModelResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ChatMessage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedBackend {
        models: Vec<String>,
        calls: AtomicUsize,
    }

    impl FixedBackend {
        fn new(models: &[&str]) -> Self {
            Self {
                models: models.iter().map(|s| s.to_string()).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatModel for FixedBackend {
        async fn chat(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _json_mode: bool,
        ) -> Result<String, ProviderError> {
            unreachable!("resolver never chats")
        }

        async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.models.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn preferred_model_wins_when_available() {
        let backend = FixedBackend::new(&["mistral:instruct", "llama2:7b-chat"]);
        let resolver = ModelResolver::new();
        let model = resolver
            .resolve(&backend, "mistral:instruct", None)
            .await
            .unwrap();
        assert_eq!(model, "mistral:instruct");
    }

    #[tokio::test]
    async fn explicit_fallback_is_used() {
        let backend = FixedBackend::new(&["llama2:7b-chat"]);
        let resolver = ModelResolver::new();
        let model = resolver
            .resolve(&backend, "mistral:instruct", Some("llama2:7b-chat"))
            .await
            .unwrap();
        assert_eq!(model, "llama2:7b-chat");
    }

    #[tokio::test]
    async fn generic_fallback_when_no_explicit() {
        let backend = FixedBackend::new(&["mistral:instruct"]);
        let resolver = ModelResolver::new();
        let model = resolver
            .resolve(&backend, "nomic-embed-text:latest", None)
            .await
            .unwrap();
        assert_eq!(model, "mistral:instruct");
    }

    #[tokio::test]
    async fn no_model_yields_error() {
        let backend = FixedBackend::new(&[]);
        let resolver = ModelResolver::new();
        let err = resolver
            .resolve(&backend, "mistral:instruct", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NoModel(_)));
    }

    #[tokio::test]
    async fn successful_resolution_is_cached() {
        let backend = FixedBackend::new(&["mistral:instruct"]);
        let resolver = ModelResolver::new();
        resolver
            .resolve(&backend, "mistral:instruct", None)
            .await
            .unwrap();
        resolver
            .resolve(&backend, "mistral:instruct", None)
            .await
            .unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
