use anyhow::{Context, Result};
use kaia_policy::CommandPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model-serving daemon (Ollama) base URL.
    pub ollama_url: String,
    /// Vector-store server base URL; probed at startup, absence is
    /// non-fatal.
    pub vector_store_url: String,
    pub chat_model: String,
    pub command_model: String,
    /// Timeout for model calls and command execution, in seconds.
    pub timeout_secs: u64,
    pub data_dir: PathBuf,
    /// Persona document; when missing, the built-in system prompt is
    /// used.
    pub persona_path: PathBuf,
    pub user_id: String,
    pub command_allowlist: Vec<String>,
    pub disk_mounts: Vec<DiskMount>,
    /// Character budget for the knowledge engine's rolling transcript.
    pub transcript_char_budget: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskMount {
    pub path: String,
    pub label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            vector_store_url: "http://localhost:8000".to_string(),
            chat_model: "llama2:7b-chat".to_string(),
            command_model: "mistral:instruct".to_string(),
            timeout_secs: 300,
            data_dir: PathBuf::from("./data"),
            persona_path: PathBuf::from("./data/persona.md"),
            user_id: "default_user".to_string(),
            command_allowlist: CommandPolicy::default_allowlist(),
            disk_mounts: vec![
                DiskMount {
                    path: "/".to_string(),
                    label: "Root".to_string(),
                },
                DiskMount {
                    path: "/home".to_string(),
                    label: "Home".to_string(),
                },
                DiskMount {
                    path: "/boot".to_string(),
                    label: "Boot".to_string(),
                },
            ],
            transcript_char_budget: 32_768,
        }
    }
}

impl Config {
    /// Load from a TOML file; a missing file yields the defaults, an
    /// unreadable or invalid file is a startup error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Environment overrides, applied after file values.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("KAIA_OLLAMA_URL") {
            self.ollama_url = url;
        }
        if let Ok(model) = std::env::var("KAIA_CHAT_MODEL") {
            self.chat_model = model;
        }
        if let Ok(model) = std::env::var("KAIA_COMMAND_MODEL") {
            self.command_model = model;
        }
        if let Ok(dir) = std::env::var("KAIA_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("kaia.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_services() {
        let config = Config::default();
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.vector_store_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 300);
        assert!(!config.command_allowlist.is_empty());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let parsed: Config = toml::from_str("chat_model = \"llama3:8b\"\n").unwrap();
        assert_eq!(parsed.chat_model, "llama3:8b");
        assert_eq!(parsed.command_model, "mistral:instruct");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let config = Config::load(Path::new("/definitely/not/a/kaia.toml")).unwrap();
        assert_eq!(config.user_id, "default_user");
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.disk_mounts.len(), config.disk_mounts.len());
    }
}
