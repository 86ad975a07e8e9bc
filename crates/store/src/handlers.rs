//! Phrase-driven storage and retrieval on top of the store.

use crate::{AssistantStore, StoreError};
use tracing::info;

/// Phrases that map to a preference key when they appear in a storage
/// request. Checked after the "remember that" fact pattern.
const PREFERENCE_PATTERNS: &[(&str, &str)] = &[
    ("favorite color is", "favorite_color"),
    ("default editor is", "default_editor"),
    ("preferred output method is", "output_method"),
    ("my pet's name is", "pet_name"),
];

/// Try to interpret `input` as a storage request. Returns the reply to
/// show the user, or `None` when the input matched no storage pattern.
pub fn handle_memory_storage(
    store: &AssistantStore,
    user_id: &str,
    input: &str,
) -> Result<Option<String>, StoreError> {
    let lower = input.to_lowercase();
    // Byte offsets found in the lowercased copy are only valid in the
    // original when lowercasing preserved lengths.
    if lower.len() != input.len() {
        return Ok(None);
    }

    if let Some(idx) = lower.find("remember that") {
        let fact = input
            .get(idx + "remember that".len()..)
            .unwrap_or_default()
            .trim();
        if fact.is_empty() {
            return Ok(Some("There was nothing to remember.".to_string()));
        }
        store.store_fact(fact, "user_input", None)?;
        info!(fact, "fact stored");
        return Ok(Some(format!("Stored fact: \"{}\"", fact)));
    }

    for (phrase, key) in PREFERENCE_PATTERNS {
        if let Some(idx) = lower.find(phrase) {
            let value = input.get(idx + phrase.len()..).unwrap_or_default().trim();
            if value.is_empty() {
                return Ok(Some(format!("No value given for {}.", key)));
            }
            store.set_preference(user_id, key, value)?;
            info!(key, value, "preference set");
            return Ok(Some(format!(
                "Preference saved: {} = {}",
                key.replace('_', " "),
                value
            )));
        }
    }

    Ok(None)
}

#[derive(Debug)]
pub struct RetrievalReply {
    pub message: String,
    pub items: Vec<String>,
    pub response_type: &'static str,
}

/// Answer a retrieval request from stored data. Always produces a reply;
/// unrecognized requests get an explanatory message.
pub fn handle_data_retrieval(
    store: &AssistantStore,
    user_id: &str,
    input: &str,
) -> Result<RetrievalReply, StoreError> {
    let lower = input.to_lowercase();

    if lower.contains("fact") {
        let facts = store.all_facts()?;
        if facts.is_empty() {
            return Ok(RetrievalReply {
                message: "No facts are currently stored.".to_string(),
                items: Vec::new(),
                response_type: "facts_retrieved",
            });
        }
        let items = facts
            .iter()
            .map(|f| {
                format!(
                    "ID: {}, Fact: \"{}\", Source: {}, Time: {}",
                    f.id, f.text, f.source, f.timestamp
                )
            })
            .collect();
        return Ok(RetrievalReply {
            message: "Here are the stored facts:".to_string(),
            items,
            response_type: "facts_retrieved",
        });
    }

    if lower.contains("preference") {
        let prefs = store.all_preferences(user_id)?;
        if prefs.is_empty() {
            return Ok(RetrievalReply {
                message: "No preferences are currently stored.".to_string(),
                items: Vec::new(),
                response_type: "preferences_retrieved",
            });
        }
        let items = prefs
            .iter()
            .map(|p| format!("{}: {}", title_case(&p.key), p.value))
            .collect();
        return Ok(RetrievalReply {
            message: "Here are your stored preferences:".to_string(),
            items,
            response_type: "preferences_retrieved",
        });
    }

    if lower.contains("history") {
        let interactions = store.recent_interactions(20)?;
        if interactions.is_empty() {
            return Ok(RetrievalReply {
                message: "No interaction history yet.".to_string(),
                items: Vec::new(),
                response_type: "history_retrieved",
            });
        }
        let items = interactions
            .iter()
            .map(|i| format!("[{}] {} -> {}", i.timestamp, i.user_query, i.response_type))
            .collect();
        return Ok(RetrievalReply {
            message: "Recent interactions:".to_string(),
            items,
            response_type: "history_retrieved",
        });
    }

    if lower.contains("persona") {
        let details = store.all_persona_details()?;
        let items = details
            .iter()
            .map(|(key, value)| format!("{}: {}", title_case(key), value))
            .collect();
        return Ok(RetrievalReply {
            message: "Here are my persona details:".to_string(),
            items,
            response_type: "persona_details_retrieved",
        });
    }

    Ok(RetrievalReply {
        message: "I couldn't determine what specific data you wanted to retrieve.".to_string(),
        items: Vec::new(),
        response_type: "data_retrieval_failed",
    })
}

fn title_case(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remember_that_stores_a_fact() {
        let store = AssistantStore::open_in_memory().unwrap();
        let reply = handle_memory_storage(&store, "default_user", "Remember that I use zsh")
            .unwrap()
            .unwrap();
        assert!(reply.contains("I use zsh"));
        assert_eq!(store.all_facts().unwrap().len(), 1);
    }

    #[test]
    fn preference_phrase_sets_preference() {
        let store = AssistantStore::open_in_memory().unwrap();
        let reply = handle_memory_storage(&store, "default_user", "My favorite color is blue")
            .unwrap()
            .unwrap();
        assert!(reply.contains("blue"));
        assert_eq!(
            store
                .preference("default_user", "favorite_color")
                .unwrap()
                .as_deref(),
            Some("blue")
        );
    }

    #[test]
    fn unrelated_input_is_not_a_storage_request() {
        let store = AssistantStore::open_in_memory().unwrap();
        let reply = handle_memory_storage(&store, "default_user", "what time is it").unwrap();
        assert!(reply.is_none());
    }

    #[test]
    fn empty_fact_is_reported() {
        let store = AssistantStore::open_in_memory().unwrap();
        let reply = handle_memory_storage(&store, "default_user", "remember that")
            .unwrap()
            .unwrap();
        assert!(reply.contains("nothing to remember"));
        assert!(store.all_facts().unwrap().is_empty());
    }

    #[test]
    fn retrieval_lists_facts() {
        let store = AssistantStore::open_in_memory().unwrap();
        store.store_fact("I use zsh", "user_input", None).unwrap();

        let reply = handle_data_retrieval(&store, "default_user", "list all facts").unwrap();
        assert_eq!(reply.response_type, "facts_retrieved");
        assert_eq!(reply.items.len(), 1);
        assert!(reply.items[0].contains("I use zsh"));
    }

    #[test]
    fn retrieval_formats_preference_keys() {
        let store = AssistantStore::open_in_memory().unwrap();
        store
            .set_preference("default_user", "favorite_color", "blue")
            .unwrap();

        let reply = handle_data_retrieval(&store, "default_user", "show my preferences").unwrap();
        assert_eq!(reply.items, vec!["Favorite Color: blue"]);
    }

    #[test]
    fn retrieval_without_match_explains_itself() {
        let store = AssistantStore::open_in_memory().unwrap();
        let reply = handle_data_retrieval(&store, "default_user", "show me the weather").unwrap();
        assert_eq!(reply.response_type, "data_retrieval_failed");
        assert!(reply.items.is_empty());
    }
}
