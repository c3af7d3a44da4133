//! Service settings loaded from the environment

use std::path::PathBuf;

use secrecy::SecretString;

use crate::errors::EngineError;
use crate::logs::LogLevel;

/// Service settings
///
/// Collaborator credentials come from the environment; the service refuses
/// to start without them. Everything else has a default.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Shared secret checked against the request `secret` field
    pub shared_secret: SecretString,

    /// Repository host configuration
    pub github: GitHubSettings,

    /// Content generator configuration
    pub generator: GeneratorSettings,

    /// Path of the completed-task store file
    pub store_path: PathBuf,

    /// Bind host override, when set
    pub bind_host: Option<String>,

    /// Bind port override, when set
    pub bind_port: Option<u16>,

    /// Log level
    pub log_level: LogLevel,
}

/// Repository host (GitHub) settings
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    /// REST API base URL
    pub api_base: String,

    /// Account owning the deployed repositories
    pub owner: String,

    /// Personal access token
    pub token: SecretString,
}

/// Content generator (AIPipe) settings
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// API base URL
    pub base_url: String,

    /// Bearer token
    pub token: SecretString,

    /// Model identifier
    pub model: String,
}

pub fn default_store_path() -> PathBuf {
    PathBuf::from("/tmp/deployed_projects.json")
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_generator_base_url() -> String {
    "https://aipipe.org/openai/v1".to_string()
}

fn default_generator_model() -> String {
    "gpt-4.1-nano".to_string()
}

impl Settings {
    /// Load settings from the environment
    pub fn from_env() -> Result<Self, EngineError> {
        let shared_secret = SecretString::from(require_env("USER_SECRET")?);

        let github = GitHubSettings {
            api_base: checked_base_url(
                optional_env("GITHUB_API_BASE").unwrap_or_else(default_github_api_base),
                "GITHUB_API_BASE",
            )?,
            owner: require_env("GITHUB_USERNAME")?,
            token: SecretString::from(require_env("GITHUB_TOKEN")?),
        };

        let generator = GeneratorSettings {
            base_url: checked_base_url(
                optional_env("AIPIPE_BASE_URL").unwrap_or_else(default_generator_base_url),
                "AIPIPE_BASE_URL",
            )?,
            token: SecretString::from(require_env("AIPIPE_TOKEN")?),
            model: default_generator_model(),
        };

        let store_path = optional_env("TASK_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_store_path);

        let bind_host = optional_env("BIND_HOST");
        let bind_port = match optional_env("BIND_PORT") {
            Some(value) => Some(value.parse::<u16>().map_err(|e| {
                EngineError::ConfigError(format!("Invalid BIND_PORT: {}", e))
            })?),
            None => None,
        };

        let log_level = match optional_env("LOG_LEVEL") {
            Some(value) => value
                .parse::<LogLevel>()
                .map_err(EngineError::ConfigError)?,
            None => LogLevel::Info,
        };

        Ok(Self {
            shared_secret,
            github,
            generator,
            store_path,
            bind_host,
            bind_port,
            log_level,
        })
    }
}

fn require_env(name: &str) -> Result<String, EngineError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            EngineError::ConfigError(format!("Missing required environment variable: {}", name))
        })
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn checked_base_url(value: String, name: &str) -> Result<String, EngineError> {
    url::Url::parse(&value)
        .map_err(|e| EngineError::ConfigError(format!("Invalid {}: {}", name, e)))?;
    Ok(value.trim_end_matches('/').to_string())
}
