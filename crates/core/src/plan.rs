use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Command,
    KnowledgeQuery,
    RetrieveData,
    StoreData,
    SystemStatus,
    #[serde(rename = "get_persona_content")]
    PersonaContent,
    Chat,
}

impl Action {
    /// Stable label used when logging interactions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Command => "command",
            Action::KnowledgeQuery => "knowledge_query",
            Action::RetrieveData => "retrieve_data",
            Action::StoreData => "store_data",
            Action::SystemStatus => "system_status",
            Action::PersonaContent => "get_persona_content",
            Action::Chat => "chat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPlan {
    pub action: Action,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    action: Action,
    #[serde(default)]
    content: serde_json::Value,
}

impl ActionPlan {
    pub fn chat(input: &str) -> Self {
        Self {
            action: Action::Chat,
            content: input.to_string(),
        }
    }

    /// Parse the planner model's JSON reply. Anything that does not
    /// deserialize into a known action falls back to chat with the
    /// original input, never to an error.
    pub fn parse(raw: &str, original_input: &str) -> Self {
        let parsed: Result<RawPlan, _> = serde_json::from_str(raw.trim());
        match parsed {
            Ok(plan) => {
                let content = match plan.content {
                    serde_json::Value::String(s) if !s.is_empty() => s,
                    // Some models hand back the content as a list of
                    // fragments.
                    serde_json::Value::Array(items) => {
                        let joined = items
                            .iter()
                            .filter_map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(" ");
                        if joined.is_empty() {
                            original_input.to_string()
                        } else {
                            joined
                        }
                    }
                    _ => original_input.to_string(),
                };
                Self {
                    action: plan.action,
                    content,
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, raw, "planner output was not a valid plan");
                Self::chat(original_input)
            }
        }
    }

    /// Keyword heuristics used when the planner model call itself fails.
    pub fn classify_fallback(input: &str) -> Self {
        let lower = input.to_lowercase();

        const KNOWLEDGE: &[&str] = &[
            "what is",
            "who is",
            "explain",
            "tell me about",
            "according to",
            "summarize",
            "synopsis of",
        ];
        const COMMAND: &[&str] = &["list files", "show contents", "run command", "ls ", "cd "];
        const RETRIEVE: &[&str] = &[
            "list my facts",
            "list history",
            "show interaction history",
            "what do you know about me",
            "my preferences",
        ];
        const STORE: &[&str] = &["remember that", "remember i "];
        const STATUS: &[&str] = &[
            "status",
            "how is my computer doing",
            "system info",
            "show system status",
        ];

        let action = if KNOWLEDGE.iter().any(|k| lower.contains(k)) {
            Action::KnowledgeQuery
        } else if STORE.iter().any(|k| lower.contains(k)) {
            Action::StoreData
        } else if COMMAND.iter().any(|k| lower.contains(k)) {
            Action::Command
        } else if RETRIEVE.iter().any(|k| lower.contains(k)) {
            Action::RetrieveData
        } else if STATUS.iter().any(|k| lower.contains(k)) {
            Action::SystemStatus
        } else {
            Action::Chat
        };

        Self {
            action,
            content: input.to_string(),
        }
    }
}
