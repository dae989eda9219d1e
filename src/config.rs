use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::Result;
use crate::errors::SupportRagError;

/// Environment variable holding the completion service credential
pub const LLM_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the listening port
pub const PORT_ENV: &str = "PORT";

/// Environment variable overriding the log level
pub const LOG_LEVEL_ENV: &str = "SUPPORTRAG_LOG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors")]
    pub cors: bool,
    /// Upper bound for a single request, including the completion call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// `ollama` or `openai`
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub dimension: usize,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_embedding_provider() -> String {
    "ollama".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    pub endpoint: String,
    pub collection: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub llm_endpoint: String,
    #[serde(default)]
    pub llm_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_grounded_max_tokens")]
    pub grounded_max_tokens: u32,
    #[serde(default = "default_unaided_max_tokens")]
    pub unaided_max_tokens: u32,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

pub(crate) fn default_temperature() -> f32 {
    0.1
}

pub(crate) fn default_grounded_max_tokens() -> u32 {
    800
}

pub(crate) fn default_unaided_max_tokens() -> u32 {
    600
}

fn default_llm_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Fan-out used when the request does not ask for a specific count
    #[serde(default = "default_retrieval_limit")]
    pub limit: usize,
    /// Hard ceiling for `max_results` supplied by callers
    #[serde(default = "default_retrieval_max_limit")]
    pub max_limit: usize,
}

pub(crate) fn default_retrieval_limit() -> usize {
    5
}

pub(crate) fn default_retrieval_max_limit() -> usize {
    20
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            limit: default_retrieval_limit(),
            max_limit: default_retrieval_max_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub product_name: String,
    pub product_description: String,
    pub docs_url: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            product_name: "Crossmint".to_string(),
            product_description:
                "a platform for integrating wallets, stablecoins, and blockchain primitives"
                    .to_string(),
            docs_url: "https://docs.crossmint.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_server")]
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub embeddings: EmbeddingsConfig,
    pub vector_store: VectorStoreConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
        cors: default_cors(),
        request_timeout_secs: default_request_timeout_secs(),
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from default config file path
    ///
    /// Falls back to built-in defaults when neither `config.toml` nor
    /// `config.example.toml` exists. Environment overrides are applied last.
    pub fn load() -> Result<Self> {
        let mut config = if Path::new("config.toml").exists() {
            Self::from_file("config.toml")?
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")?
        } else {
            tracing::warn!("No config file found, using built-in defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit path, then apply environment overrides
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply process environment overrides on top of the file values
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    pub(crate) fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(LLM_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.llm.llm_key = Some(key);
        }

        if let Some(port) = lookup(PORT_ENV).and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }

        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|l| !l.trim().is_empty()) {
            self.logging.level = level;
        }
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.embeddings.endpoint)?;
        url::Url::parse(&self.vector_store.endpoint)?;
        url::Url::parse(&self.llm.llm_endpoint)?;
        url::Url::parse(&self.assistant.docs_url)?;

        if self.retrieval.limit == 0 {
            return Err(SupportRagError::ConfigError(
                "retrieval.limit must be at least 1".to_string(),
            ));
        }
        if self.retrieval.limit > self.retrieval.max_limit {
            return Err(SupportRagError::ConfigError(format!(
                "retrieval.limit ({}) exceeds retrieval.max_limit ({})",
                self.retrieval.limit, self.retrieval.max_limit
            )));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(SupportRagError::ConfigError(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.grounded_max_tokens == 0 || self.llm.unaided_max_tokens == 0 {
            return Err(SupportRagError::ConfigError(
                "llm max token ceilings must be non-zero".to_string(),
            ));
        }
        if self.vector_store.collection.trim().is_empty() {
            return Err(SupportRagError::ConfigError(
                "vector_store.collection must not be empty".to_string(),
            ));
        }
        match self.embeddings.provider.as_str() {
            "ollama" | "openai" => {}
            other => {
                return Err(SupportRagError::ConfigError(format!(
                    "Unsupported embeddings provider: {other}"
                )))
            }
        }

        Ok(())
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Get embedding dimension
    pub fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Get vector store endpoint
    pub fn vector_store_endpoint(&self) -> &str {
        &self.vector_store.endpoint
    }

    /// Get vector store collection name
    pub fn collection_name(&self) -> &str {
        &self.vector_store.collection
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.llm_endpoint
    }

    /// Get LLM key, if one is configured and non-blank
    pub fn llm_key(&self) -> Option<&str> {
        self.llm
            .llm_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.llm_model
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            logging: LoggingConfig {
                level: "info".to_string(),
                backtrace: true,
            },
            embeddings: EmbeddingsConfig {
                provider: default_embedding_provider(),
                endpoint: "http://localhost:11434".to_string(),
                model: "all-minilm".to_string(),
                dimension: 384,
                api_key: None,
            },
            vector_store: VectorStoreConfig {
                endpoint: "http://localhost:8001".to_string(),
                collection: "crossmint_docs".to_string(),
            },
            llm: LlmConfig {
                llm_endpoint: "https://api.openai.com/v1".to_string(),
                llm_key: None,
                llm_model: default_llm_model(),
                temperature: default_temperature(),
                grounded_max_tokens: default_grounded_max_tokens(),
                unaided_max_tokens: default_unaided_max_tokens(),
                timeout_secs: default_llm_timeout_secs(),
            },
            retrieval: RetrievalConfig::default(),
            assistant: AssistantConfig::default(),
        }
    }
}
