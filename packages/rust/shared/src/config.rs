//! Application configuration for PageLens.
//!
//! User config lives at `~/.pagelens/pagelens.toml`.
//! Credentials are never stored in the file — the config holds the *names*
//! of the environment variables to read them from, and they are resolved
//! once at startup into an explicit [`Credentials`] value passed into the
//! pipeline (never ambient global state).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PageLensError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "pagelens.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".pagelens";

// ---------------------------------------------------------------------------
// Config structs (matching pagelens.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM provider settings (summarizer stage).
    #[serde(default)]
    pub llm: LlmConfig,

    /// Enrichment provider settings (the three knowledge services).
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the chat-completion API.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model to use for summarization and topic extraction.
    #[serde(default = "default_llm_model")]
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_llm_api_key_env(),
            base_url: default_llm_base_url(),
            model: default_llm_model(),
        }
    }
}

fn default_llm_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_llm_model() -> String {
    "gpt-4o".into()
}

/// `[enrichment]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Completion endpoint shared by all three knowledge services.
    #[serde(default = "default_enrichment_endpoint")]
    pub endpoint: String,

    /// Env var holding the architecture service token.
    #[serde(default = "default_architecture_token_env")]
    pub architecture_token_env: String,

    /// Env var holding the performance service token.
    #[serde(default = "default_performance_token_env")]
    pub performance_token_env: String,

    /// Env var holding the ML resources service token.
    #[serde(default = "default_ml_resources_token_env")]
    pub ml_resources_token_env: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            endpoint: default_enrichment_endpoint(),
            architecture_token_env: default_architecture_token_env(),
            performance_token_env: default_performance_token_env(),
            ml_resources_token_env: default_ml_resources_token_env(),
        }
    }
}

fn default_enrichment_endpoint() -> String {
    "https://api.langbase.com/beta/generate".into()
}
fn default_architecture_token_env() -> String {
    "CPP_ARCHITECTURE_TOKEN".into()
}
fn default_performance_token_env() -> String {
    "CPP_PERFORMANCE_TOKEN".into()
}
fn default_ml_resources_token_env() -> String {
    "ML_RESOURCE_TOKEN".into()
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP server.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8787".into()
}

// ---------------------------------------------------------------------------
// Credentials (runtime, resolved from env once at startup)
// ---------------------------------------------------------------------------

/// Resolved secrets for all outbound services.
///
/// Missing env vars resolve to empty strings: an empty LLM key is a fatal
/// configuration error surfaced before any work starts, while an empty
/// enrichment token simply makes that provider fail its call and be
/// sentinel-mapped like any other provider failure.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub llm_api_key: String,
    pub architecture_token: String,
    pub performance_token: String,
    pub ml_resources_token: String,
}

impl Credentials {
    /// Read all credential env vars named by the config.
    pub fn resolve(config: &AppConfig) -> Self {
        let read = |name: &str| std::env::var(name).unwrap_or_default();
        Self {
            llm_api_key: read(&config.llm.api_key_env),
            architecture_token: read(&config.enrichment.architecture_token_env),
            performance_token: read(&config.enrichment.performance_token_env),
            ml_resources_token: read(&config.enrichment.ml_resources_token_env),
        }
    }

    /// Whether the required LLM key is present.
    pub fn has_llm_key(&self) -> bool {
        !self.llm_api_key.is_empty()
    }
}

/// Check that the LLM API key env var is set and non-empty.
pub fn validate_llm_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.llm.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(PageLensError::config(format!(
            "LLM API key not found. Set the {var_name} environment variable."
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.pagelens/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PageLensError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.pagelens/pagelens.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PageLensError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        PageLensError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PageLensError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PageLensError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PageLensError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
