//! Configuration management
//!
//! Handles configuration from environment variables and TOML config files
//! with sensible defaults for local use. Backend selection is a
//! construction-time choice; a running pipeline never switches backends.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Recognition backend selection and model artifacts
    pub backend: BackendConfig,

    /// Entity-linking enrichment service
    pub linking: LinkingConfig,

    /// Graph document sizing
    pub render: RenderOptions,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(kind) = std::env::var("ENTIGRAPH_BACKEND") {
            config.backend.kind = kind.parse()?;
        }
        if let Ok(path) = std::env::var("ENTIGRAPH_MODEL") {
            config.backend.model_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("ENTIGRAPH_GAZETTEER") {
            config.backend.gazetteer_path = Some(PathBuf::from(path));
        }

        if let Ok(enabled) = std::env::var("ENTIGRAPH_LINKING") {
            config.linking.enabled = matches!(enabled.as_str(), "1" | "true" | "yes");
        }
        if let Ok(url) = std::env::var("ENTIGRAPH_LINKING_URL") {
            config.linking.base_url = url;
        }
        if let Ok(lang) = std::env::var("ENTIGRAPH_LINKING_LANG") {
            config.linking.language = lang;
        }

        if let Ok(height) = std::env::var("ENTIGRAPH_GRAPH_HEIGHT") {
            config.render.height = height;
        }
        if let Ok(width) = std::env::var("ENTIGRAPH_GRAPH_WIDTH") {
            config.render.width = width;
        }

        if let Ok(level) = std::env::var("ENTIGRAPH_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }
}

/// Recognition backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Which backend variant to construct
    pub kind: BackendKind,

    /// Model artifact for the token-classification backend.
    /// A configured path that cannot be loaded is fatal at construction.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub model_path: Option<PathBuf>,

    /// Optional gazetteer file for the lexicon backend
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub gazetteer_path: Option<PathBuf>,
}

/// The two recognition backend variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Linguistic-pipeline style: whole spans with closed-set labels
    #[default]
    Lexicon,
    /// Token-classification style: IOB-tagged token records
    Token,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexicon => write!(f, "lexicon"),
            Self::Token => write!(f, "token"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexicon" => Ok(Self::Lexicon),
            "token" => Ok(Self::Token),
            _ => Err(ConfigError::InvalidValue {
                key: "ENTIGRAPH_BACKEND".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Entity-linking enrichment service configuration.
///
/// Linking augments recognized spans with knowledge-base identifiers; the
/// service being unreachable degrades output, it never fails a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkingConfig {
    /// Whether to attempt linking at all
    pub enabled: bool,

    /// Base URL of the linking service
    pub base_url: String,

    /// Language for disambiguation
    pub language: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://nerd.huma-num.fr/nerd/service".to_string(),
            language: "en".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Caller-supplied sizing for the generated graph document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// CSS height of the graph canvas (e.g. "400px", "100vh")
    pub height: String,

    /// CSS width of the graph canvas (e.g. "100%", "800px")
    pub width: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            height: "400px".to_string(),
            width: "100%".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
