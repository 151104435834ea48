use std::path::Path;
use std::time::Duration;

use config::{ConfigError, Environment, File, Map};
use serde::Deserialize;

use crate::domain::ingestion::{ChunkingConfig, ChunkingType, IngestionConfig};
use crate::domain::workflow::IngestionPolicy;
use crate::infrastructure::llm::DEFAULT_OPENAI_BASE_URL;

const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
const OPENAI_EMBEDDING_API_KEY: &str = "OPENAI_EMBEDDING_API_KEY";
const OPENAI_EMBEDDING_BASE_URL: &str = "OPENAI_EMBEDDING_BASE_URL";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub openai: OpenAiConfig,
    pub knowledge: KnowledgeConfig,
    pub workflow: WorkflowConfig,
    /// Problems found while loading that did not stop it, for logging
    /// once the subscriber is installed
    #[serde(skip)]
    pub load_warnings: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Credentials and endpoints for the OpenAI-compatible API
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Falls back to `api_key`
    pub embedding_api_key: Option<String>,
    /// Falls back to `base_url`
    pub embedding_base_url: Option<String>,
    pub timeout_secs: u64,
    /// Sampling temperature; the model default when unset
    pub temperature: Option<f32>,
    /// Upper bound on answer tokens; the model default when unset
    pub max_tokens: Option<u32>,
}

/// Knowledge store, chunking and retrieval settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub top_k: u32,
    pub similarity_threshold: f32,
    pub chunking: ChunkingType,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub min_chunk_size: usize,
    pub batch_size: usize,
    pub max_context_chars: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub ingestion_policy: IngestionPolicy,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            embedding_api_key: None,
            embedding_base_url: None,
            timeout_secs: 120,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        let chunking = ChunkingConfig::default();
        Self {
            top_k: 5,
            similarity_threshold: 0.3,
            chunking: ChunkingType::default(),
            chunk_size: chunking.chunk_size,
            chunk_overlap: chunking.chunk_overlap,
            min_chunk_size: chunking.min_chunk_size,
            batch_size: 100,
            max_context_chars: 12_000,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl OpenAiConfig {
    pub fn chat_api_key(&self) -> Option<&str> {
        non_blank(&self.api_key)
    }

    pub fn chat_base_url(&self) -> &str {
        non_blank(&self.base_url).unwrap_or(DEFAULT_OPENAI_BASE_URL)
    }

    pub fn embedding_api_key(&self) -> Option<&str> {
        non_blank(&self.embedding_api_key).or_else(|| self.chat_api_key())
    }

    pub fn embedding_base_url(&self) -> &str {
        non_blank(&self.embedding_base_url).unwrap_or_else(|| self.chat_base_url())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Fill unset values from the conventional `OPENAI_*` variables
    fn fill_from(&mut self, vars: &Map<String, String>) {
        let slots = [
            (&mut self.api_key, OPENAI_API_KEY),
            (&mut self.base_url, OPENAI_BASE_URL),
            (&mut self.embedding_api_key, OPENAI_EMBEDDING_API_KEY),
            (&mut self.embedding_base_url, OPENAI_EMBEDDING_BASE_URL),
        ];

        for (slot, key) in slots {
            if non_blank(slot).is_none() {
                if let Some(value) = vars.get(key).filter(|v| !v.trim().is_empty()) {
                    *slot = Some(value.clone());
                }
            }
        }
    }
}

impl KnowledgeConfig {
    pub fn chunking_config(&self) -> ChunkingConfig {
        ChunkingConfig::new(self.chunk_size, self.chunk_overlap)
            .with_min_chunk_size(self.min_chunk_size.min(self.chunk_size))
    }

    /// Ingestion settings for one document, before caller tags are added
    pub fn ingestion_config(&self) -> IngestionConfig {
        IngestionConfig::new()
            .with_chunking_type(self.chunking)
            .with_chunking_config(self.chunking_config())
            .with_batch_size(self.batch_size)
    }
}

impl AppConfig {
    /// Load configuration from `config/default.toml`, `config/local.toml`
    /// and the environment.
    ///
    /// Environment values come from the dotenv file (`env_file`, or `.env`
    /// in the working directory when present) overlaid with the process
    /// environment. The process environment itself is never modified.
    pub fn load(env_file: Option<&Path>) -> Result<Self, ConfigError> {
        let (mut vars, warnings) = match env_file {
            Some(path) => (read_env_file(path)?, Vec::new()),
            None => read_default_env_file(),
        };
        vars.extend(std::env::vars());

        let mut app = Self::load_from(vars)?;
        app.load_warnings = warnings;
        Ok(app)
    }

    /// Load configuration using `vars` as the complete environment
    pub fn load_from(vars: Map<String, String>) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            )
            .build()?;

        let mut app: Self = config.try_deserialize()?;
        app.openai.fill_from(&vars);

        Ok(app)
    }
}

/// Entries of an explicitly requested dotenv file; a missing file is an error
fn read_env_file(path: &Path) -> Result<Map<String, String>, ConfigError> {
    let entries = dotenvy::from_path_iter(path).map_err(|e| {
        ConfigError::Message(format!("Failed to read env file '{}': {}", path.display(), e))
    })?;

    entries
        .map(|entry| {
            entry.map_err(|e| {
                ConfigError::Message(format!("Invalid entry in '{}': {}", path.display(), e))
            })
        })
        .collect()
}

/// Entries of `.env` from the working directory or its parents, if any.
/// Unreadable lines are skipped and reported as warnings.
fn read_default_env_file() -> (Map<String, String>, Vec<String>) {
    match dotenvy::dotenv_iter() {
        Ok(entries) => collect_lenient(entries, ".env"),
        Err(e) if e.not_found() => (Map::new(), Vec::new()),
        Err(e) => (Map::new(), vec![format!("Ignoring .env: {}", e)]),
    }
}

fn collect_lenient(
    entries: impl Iterator<Item = Result<(String, String), dotenvy::Error>>,
    origin: &str,
) -> (Map<String, String>, Vec<String>) {
    let mut vars = Map::new();
    let mut warnings = Vec::new();

    for entry in entries {
        match entry {
            Ok((key, value)) => {
                vars.insert(key, value);
            }
            Err(e) => warnings.push(format!("Skipped invalid entry in {}: {}", origin, e)),
        }
    }

    (vars, warnings)
}
