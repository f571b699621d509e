//! Configuration for the document compliance service
//!
//! Values come from [`AppConfig::default`], then an optional TOML file named by
//! `DOC_COMPLIANCE_CONFIG`, then environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "DOC_COMPLIANCE_CONFIG";

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload and job storage
    #[serde(default)]
    pub storage: StorageConfig,
    /// Text generation backend
    #[serde(default)]
    pub llm: LlmConfig,
    /// Agent job pipeline
    #[serde(default)]
    pub agent: AgentConfig,
    /// Report and rewrite settings
    #[serde(default)]
    pub compliance: ComplianceConfig,
    /// API key authentication
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load defaults, the optional TOML file, then environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(&path))?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse TOML config text
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base) = get("BASE_DIR") {
            let base = PathBuf::from(base);
            self.storage.upload_dir = base.join("static");
            self.storage.jobs_dir = None;
        }
        if let Some(dir) = get("UPLOAD_DIR") {
            self.storage.upload_dir = PathBuf::from(dir);
            self.storage.jobs_dir = None;
        }
        if let Some(dir) = get("JOBS_DIR") {
            self.storage.jobs_dir = Some(PathBuf::from(dir));
        }
        if let Some(size) = get("MAX_FILE_SIZE_BYTES").and_then(|s| s.parse().ok()) {
            self.storage.max_file_size = size;
        }
        if let Some(key) = get("MISTRAL_API_KEY").or_else(|| get("OPENAI_API_KEY")) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = get("MISTRAL_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(lang) = get("LANGUAGE_TOOL_LANG") {
            self.compliance.language = lang;
        }
        if let Some(key) = get("API_KEY") {
            self.auth.api_key = Some(key);
        }
        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Request body limit in bytes (should exceed `storage.max_file_size`)
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_size: 25 * 1024 * 1024,
        }
    }
}

/// Upload storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for uploaded documents, one sub-folder per document
    pub upload_dir: PathBuf,
    /// Directory for job records (default: `<upload_dir>/_jobs`)
    #[serde(default)]
    pub jobs_dir: Option<PathBuf>,
    /// Maximum accepted upload size in bytes
    pub max_file_size: usize,
    /// Accepted upload extensions (lowercase, no dot)
    pub allowed_extensions: Vec<String>,
}

impl StorageConfig {
    /// Resolved job record directory
    pub fn jobs_dir(&self) -> PathBuf {
        self.jobs_dir
            .clone()
            .unwrap_or_else(|| self.upload_dir.join("_jobs"))
    }

    /// Whether an extension may be uploaded
    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.allowed_extensions.iter().any(|a| *a == ext)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(".").join("static"),
            jobs_dir: None,
            max_file_size: 20 * 1024 * 1024, // 20MB
            allowed_extensions: vec!["pdf".to_string(), "docx".to_string(), "doc".to_string()],
        }
    }
}

/// Text generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// Bearer token; generation is disabled without one
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model used when a caller does not pick one
    pub default_model: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts per endpoint, including the first
    pub max_attempts: u32,
    /// First retry delay; doubles on each further attempt
    pub backoff_base_ms: u64,
    /// Upper bound of the random delay added to each backoff
    pub max_jitter_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mistral.ai".to_string(),
            api_key: None,
            default_model: "mistral-medium".to_string(),
            timeout_secs: 30,
            max_attempts: 5,
            backoff_base_ms: 1000,
            max_jitter_ms: 500,
        }
    }
}

/// Agent job pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model asked for the plan
    pub planner_model: String,
    /// Model asked for the corrected document
    pub rewrite_model: String,
    /// Characters of extracted text included in the planning prompt
    pub excerpt_chars: usize,
    /// Characters of the plan copied into the job log
    pub plan_preview_chars: usize,
    /// Token budget per generation call
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            planner_model: "mistral-medium".to_string(),
            rewrite_model: "mistral-medium".to_string(),
            excerpt_chars: 2000,
            plan_preview_chars: 500,
            max_tokens: 2000,
            temperature: 0.0,
        }
    }
}

/// Compliance report and rewrite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceConfig {
    /// Language tag of analyzed documents
    pub language: String,
    /// Characters of text sent to the backend for summaries and rewrites
    pub max_input_chars: usize,
    /// Token budget for report summaries
    pub summary_max_tokens: u32,
    /// Token budget for synchronous rewrites
    pub rewrite_max_tokens: u32,
    /// Model for summaries and rewrites
    pub model: String,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            max_input_chars: 15000,
            summary_max_tokens: 500,
            rewrite_max_tokens: 2000,
            model: "mistral-medium".to_string(),
        }
    }
}

/// API key authentication
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Expected `x-api-key` value; `None` allows anonymous access
    #[serde(default)]
    pub api_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.storage.jobs_dir(), PathBuf::from("./static/_jobs"));
        assert_eq!(config.storage.max_file_size, 20 * 1024 * 1024);
        assert!(config.storage.is_allowed_extension("PDF"));
        assert!(!config.storage.is_allowed_extension("txt"));
        assert_eq!(config.agent.excerpt_chars, 2000);
        assert_eq!(config.agent.plan_preview_chars, 500);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            ("UPLOAD_DIR", "/data/uploads"),
            ("OPENAI_API_KEY", "sk-test"),
            ("MAX_FILE_SIZE_BYTES", "1024"),
            ("API_KEY", ""),
            ("PORT", "9000"),
        ]));

        assert_eq!(config.storage.upload_dir, PathBuf::from("/data/uploads"));
        assert_eq!(config.storage.jobs_dir(), PathBuf::from("/data/uploads/_jobs"));
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.storage.max_file_size, 1024);
        assert!(config.auth.api_key.is_none());
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_mistral_key_wins_over_openai_key() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("MISTRAL_API_KEY", "m"), ("OPENAI_API_KEY", "o")]));
        assert_eq!(config.llm.api_key.as_deref(), Some("m"));
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            [agent]
            planner_model = "open-mistral-7b"
            rewrite_model = "mistral-medium"
            excerpt_chars = 100
            plan_preview_chars = 50
            max_tokens = 256
            temperature = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.agent.planner_model, "open-mistral-7b");
        assert_eq!(config.agent.excerpt_chars, 100);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            AppConfig::from_toml("[server]\nport = \"nope\""),
            Err(Error::Config(_))
        ));
    }
}
