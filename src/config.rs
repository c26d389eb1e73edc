use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub indexing: IndexingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the listener.
    pub bind: String,
    /// Listen port; the `PORT` environment variable takes precedence.
    pub port: u16,
    /// CORS allow-list. `["*"]` allows any origin.
    pub allowed_origins: Vec<String>,
}

/// Filesystem inputs: therapist directory, source document, vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub therapists_csv: PathBuf,
    pub document_pdf: PathBuf,
    pub store_path: PathBuf,
}

/// Hosted chat-completion provider configuration.
///
/// The API key is never read from the config file; it comes from the
/// environment variable named by `api_key_env`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub base_url: String,
    pub api_key_env: String,
}

/// Embedding endpoint configuration (OpenAI-compatible `/embeddings`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub endpoint: String,
    pub model: String,
    pub dimensions: usize,
    /// Optional env var holding a bearer token for hosted endpoints.
    pub api_key_env: Option<String>,
}

/// Document chunking and retrieval parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            data: DataConfig::default(),
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            indexing: IndexingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: vec!["*".to_string()],
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            therapists_csv: PathBuf::from("data/therapists.csv"),
            document_pdf: PathBuf::from("data/mental_health_document.pdf"),
            store_path: PathBuf::from("data/vector_store.db"),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.0,
            max_tokens: 1024,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/v1".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            api_key_env: None,
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 4,
        }
    }
}

impl AppConfig {
    /// Load configuration from `./antarvaani.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e} -- using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {} -- using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Listen port, honoring the `PORT` environment variable.
    pub fn port(&self) -> u16 {
        resolve_port(self.server.port, std::env::var("PORT").ok())
    }

    fn config_path() -> PathBuf {
        PathBuf::from("antarvaani.toml")
    }
}

fn resolve_port(config_port: u16, env_port: Option<String>) -> u16 {
    match env_port.as_deref().map(str::parse::<u16>) {
        Some(Ok(port)) => port,
        Some(Err(_)) => {
            log::warn!("Ignoring unparseable PORT environment variable");
            config_port
        }
        None => config_port,
    }
}
