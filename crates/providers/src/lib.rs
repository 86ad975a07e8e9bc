pub mod knowledge;
pub mod ollama;
pub mod resolve;
pub mod traits;

pub use knowledge::{ChatKnowledge, KnowledgeBackend, TranscriptBuffer};
pub use ollama::OllamaClient;
pub use resolve::ModelResolver;
pub use traits::{ChatMessage, ChatModel, ProviderError};
