//! Embedded relational store for facts, preferences, interaction history
//! and persona details.

pub mod handlers;

pub use handlers::{handle_data_retrieval, handle_memory_storage, RetrievalReply};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

#[derive(Debug, Clone)]
pub struct Fact {
    pub id: i64,
    pub text: String,
    pub source: String,
    pub context: String,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct Preference {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Interaction {
    pub timestamp: String,
    pub user_query: String,
    pub response: String,
    pub response_type: String,
}

#[derive(Debug, Clone)]
pub struct StoreStatus {
    pub connected: bool,
    pub tables: Vec<String>,
}

const DEFAULT_PERSONA_DETAILS: &[(&str, &str)] = &[
    ("pet_name", "Pixel"),
    ("favorite_music_genre", "Jazz"),
    (
        "core_philosophy",
        "Logic, verifiable data, and clear causality",
    ),
    ("sarcasm_level", "dry, often sarcastic wit"),
    ("favorite_operating_system", "Arch Linux"),
];

pub struct AssistantStore {
    conn: Mutex<Connection>,
}

impl AssistantStore {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS facts (
                fact_id INTEGER PRIMARY KEY,
                fact_text TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT 'user_input',
                context TEXT NOT NULL DEFAULT 'general',
                timestamp TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS user_preferences (
                preference_id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL DEFAULT 'default_user',
                preference_key TEXT NOT NULL,
                preference_value TEXT,
                last_updated TEXT NOT NULL,
                UNIQUE(user_id, preference_key)
            );
            CREATE TABLE IF NOT EXISTS interaction_history (
                interaction_id INTEGER PRIMARY KEY,
                timestamp TEXT NOT NULL,
                user_query TEXT NOT NULL,
                kaia_response TEXT NOT NULL,
                response_type TEXT NOT NULL DEFAULT 'chat'
            );
            CREATE TABLE IF NOT EXISTS persona_details (
                detail_id INTEGER PRIMARY KEY,
                detail_key TEXT NOT NULL UNIQUE,
                detail_value TEXT NOT NULL,
                last_updated TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn now() -> String {
        chrono::Utc::now().to_rfc3339()
    }

    /// Seed default persona rows; existing keys are left untouched.
    pub fn seed_persona_defaults(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let now = Self::now();
        for (key, value) in DEFAULT_PERSONA_DETAILS {
            conn.execute(
                "INSERT OR IGNORE INTO persona_details (detail_key, detail_value, last_updated)
                 VALUES (?1, ?2, ?3)",
                params![key, value, now],
            )?;
        }
        Ok(())
    }

    pub fn store_fact(
        &self,
        text: &str,
        source: &str,
        context: Option<&str>,
    ) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO facts (fact_text, source, context, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![text, source, context.unwrap_or("general"), Self::now()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn all_facts(&self) -> Result<Vec<Fact>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT fact_id, fact_text, source, context, timestamp
             FROM facts ORDER BY timestamp DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Fact {
                id: row.get(0)?,
                text: row.get(1)?,
                source: row.get(2)?,
                context: row.get(3)?,
                timestamp: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn set_preference(&self, user_id: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO user_preferences (user_id, preference_key, preference_value, last_updated)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, preference_key) DO UPDATE SET
                 preference_value = excluded.preference_value,
                 last_updated = excluded.last_updated",
            params![user_id, key, value, Self::now()],
        )?;
        Ok(())
    }

    pub fn preference(&self, user_id: &str, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT preference_value FROM user_preferences
             WHERE user_id = ?1 AND preference_key = ?2",
            params![user_id, key],
            |row| row.get(0),
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn all_preferences(&self, user_id: &str) -> Result<Vec<Preference>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT preference_key, preference_value FROM user_preferences
             WHERE user_id = ?1 ORDER BY preference_key",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(Preference {
                key: row.get(0)?,
                value: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn log_interaction(
        &self,
        user_query: &str,
        response: &str,
        response_type: &str,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO interaction_history (timestamp, user_query, kaia_response, response_type)
             VALUES (?1, ?2, ?3, ?4)",
            params![Self::now(), user_query, response, response_type],
        )?;
        Ok(())
    }

    pub fn recent_interactions(&self, limit: usize) -> Result<Vec<Interaction>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT timestamp, user_query, kaia_response, response_type
             FROM interaction_history ORDER BY interaction_id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(Interaction {
                timestamp: row.get(0)?,
                user_query: row.get(1)?,
                response: row.get(2)?,
                response_type: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn persona_detail(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT detail_value FROM persona_details WHERE detail_key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn all_persona_details(&self) -> Result<Vec<(String, String)>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT detail_key, detail_value FROM persona_details ORDER BY detail_key",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn status(&self) -> StoreStatus {
        let conn = self.conn.lock();
        let tables = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .and_then(|mut stmt| {
                stmt.query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()
            });

        match tables {
            Ok(tables) => StoreStatus {
                connected: true,
                tables,
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to inspect store");
                StoreStatus {
                    connected: false,
                    tables: Vec::new(),
                }
            }
        }
    }
}
