//! Configuration management
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/web-researcher/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::error::{ResearchError, Result};

/// Main configuration
///
/// Every section and key may be left out of the file; missing ones take
/// their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion service endpoint
    pub openai: OpenAIConfig,
    /// Model selection per agent
    pub models: ModelConfig,
    /// Web search tool configuration
    pub search: SearchConfig,
    /// Orchestration limits and tool toggles
    pub agent: AgentConfig,
}

/// OpenAI-compatible endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAIConfig {
    /// Base URL, e.g. https://api.openai.com/v1
    pub base_url: String,
    /// API key (falls back to OPENAI_API_KEY)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model used for routing decisions
    /// Default: gpt-4o-mini
    pub supervisor: String,
    /// Model used by the researcher worker
    /// Default: gpt-4o
    pub researcher: String,
}

/// Tavily search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Tavily API base URL
    pub base_url: String,
    /// API key (falls back to TAVILY_API_KEY)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Number of results returned per query
    pub max_results: u32,
}

/// Orchestration behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum graph steps per run
    /// Default: 25
    pub max_steps: usize,
    /// Maximum model calls in one worker invocation
    /// Default: 15
    pub max_iterations: usize,
    /// Give the researcher the python code-execution tool
    pub code_execution: bool,
    /// Python interpreter used by the code-execution tool
    pub python_bin: String,
    /// Code-execution timeout in seconds
    pub code_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai: OpenAIConfig::default(),
            models: ModelConfig::default(),
            search: SearchConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            api_key: env::var("OPENAI_API_KEY").ok(),
            timeout_secs: 180,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            supervisor: env::var("WEB_RESEARCHER_SUPERVISOR_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            researcher: env::var("WEB_RESEARCHER_RESEARCHER_MODEL")
                .unwrap_or_else(|_| "gpt-4o".to_string()),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tavily.com".to_string(),
            api_key: env::var("TAVILY_API_KEY").ok(),
            max_results: 20,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 25,
            max_iterations: 15,
            code_execution: false,
            python_bin: "python3".to_string(),
            code_timeout_secs: 60,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("web-researcher")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    ///
    /// A missing file means defaults. A file that cannot be read or parsed is
    /// skipped with a warning.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        let path = Self::config_file();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }

        match Self::load_from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), "Ignoring config file: {}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(ResearchError::config("Config file not found"));
        }

        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ResearchError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)
            .map_err(|e| ResearchError::config(format!("Failed to parse config: {}", e)))?;

        // Keys are usually kept out of the file
        if config.openai.api_key.is_none() {
            config.openai.api_key = env::var("OPENAI_API_KEY").ok();
        }
        if config.search.api_key.is_none() {
            config.search.api_key = env::var("TAVILY_API_KEY").ok();
        }

        Ok(config)
    }

    /// Save configuration to file, returning the path written
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(|e| {
                ResearchError::config(format!("Failed to create config dir: {}", e))
            })?;
        }

        fs::write(&config_path, self.to_toml()?)
            .map_err(|e| ResearchError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Serialize to TOML, leaving API keys out
    pub fn to_toml(&self) -> Result<String> {
        let mut redacted = self.clone();
        redacted.openai.api_key = None;
        redacted.search.api_key = None;

        toml::to_string_pretty(&redacted)
            .map_err(|e| ResearchError::config(format!("Failed to serialize config: {}", e)))
    }

    /// Check values that would otherwise fail at request time
    pub fn validate(&self) -> Result<()> {
        for (label, raw) in [
            ("openai.base_url", &self.openai.base_url),
            ("search.base_url", &self.search.base_url),
        ] {
            url::Url::parse(raw)
                .map_err(|e| ResearchError::config(format!("Invalid {} '{}': {}", label, raw, e)))?;
        }

        if self.agent.max_steps == 0 {
            return Err(ResearchError::config("agent.max_steps must be at least 1"));
        }
        if self.agent.max_iterations == 0 {
            return Err(ResearchError::config(
                "agent.max_iterations must be at least 1",
            ));
        }
        if self.search.max_results == 0 {
            return Err(ResearchError::config("search.max_results must be at least 1"));
        }

        Ok(())
    }

    /// OpenAI API key, or a config error naming the variable to set
    pub fn openai_api_key(&self) -> Result<&str> {
        self.openai
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ResearchError::config("OPENAI_API_KEY is not set"))
    }

    /// Tavily API key, or a config error naming the variable to set
    pub fn tavily_api_key(&self) -> Result<&str> {
        self.search
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ResearchError::config("TAVILY_API_KEY is not set"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = Config::default();
        assert_eq!(config.agent.max_steps, 25);
        assert_eq!(config.agent.max_iterations, 15);
        assert_eq!(config.search.max_results, 20);
        assert!(!config.agent.code_execution);
    }

    #[test]
    fn test_to_toml_omits_keys() {
        let mut config = Config::default();
        config.openai.api_key = Some("sk-secret".into());
        config.search.api_key = Some("tvly-secret".into());

        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("supervisor"));
        assert!(toml_str.contains("researcher"));
        assert!(!toml_str.contains("secret"));
    }

    #[test]
    fn test_from_toml_without_agent_section() {
        let config = Config::from_toml(
            r#"
            [openai]
            base_url = "http://localhost:8080/v1"
            timeout_secs = 30

            [models]
            supervisor = "small"
            researcher = "large"

            [search]
            base_url = "http://localhost:9090"
            max_results = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.models.supervisor, "small");
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.agent.max_steps, 25);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::from_toml("[agent]\ncode_execution = true\n").unwrap();
        let defaults = Config::default();

        assert!(config.agent.code_execution);
        assert_eq!(config.agent.max_steps, 25);
        assert_eq!(config.agent.max_iterations, 15);
        assert_eq!(config.agent.python_bin, "python3");
        assert_eq!(config.models.supervisor, defaults.models.supervisor);
        assert_eq!(config.models.researcher, defaults.models.researcher);
        assert_eq!(config.openai.timeout_secs, 180);
        assert_eq!(config.search.max_results, 20);
    }

    #[test]
    fn test_partial_section_keeps_other_keys() {
        let config = Config::from_toml("[search]\nmax_results = 3\n").unwrap();
        assert_eq!(config.search.max_results, 3);
        assert_eq!(config.search.base_url, "https://api.tavily.com");
    }

    #[test]
    fn test_unparsable_file_is_config_error() {
        let path = env::temp_dir().join(format!("web-researcher-bad-{}.toml", std::process::id()));
        fs::write(&path, "[agent\nmax_steps = ").unwrap();

        let result = Config::load_from_path(&path);
        let _ = fs::remove_file(&path);

        match result {
            Err(ResearchError::Config(msg)) => assert!(msg.contains("parse")),
            other => panic!("expected a config error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.openai.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(ResearchError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_steps() {
        let mut config = Config::default();
        config.agent.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let mut config = Config::default();
        config.search.api_key = None;
        assert!(matches!(
            config.tavily_api_key(),
            Err(ResearchError::Config(_))
        ));
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("web-researcher"));
    }
}
