use crate::domain::model::Bracket;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Unknown layout template: '{name}'")]
    UnknownTemplate { name: String },

    #[error("Hero grid '{name}' not found in {path}")]
    GridNotFound { name: String, path: String },

    #[error("No win-rate stats for bracket {bracket} (target: {target})")]
    EmptyStatsTable { bracket: Bracket, target: String },

    #[error("Malformed stats input for bracket {bracket}: {reason}")]
    MalformedStatsInput { bracket: Bracket, reason: String },

    #[error("Unknown bracket: '{value}'")]
    UnknownBracket { value: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: '{field}'")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserInput,
    Data,
    Network,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GridError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GridError::UnknownTemplate { .. }
            | GridError::UnknownBracket { .. }
            | GridError::GridNotFound { .. } => ErrorCategory::UserInput,
            GridError::EmptyStatsTable { .. } | GridError::MalformedStatsInput { .. } => {
                ErrorCategory::Data
            }
            GridError::ApiError(_) => ErrorCategory::Network,
            GridError::IoError(_) | GridError::SerializationError(_) => ErrorCategory::Storage,
            GridError::ConfigError { .. }
            | GridError::ConfigValidationError { .. }
            | GridError::InvalidConfigValueError { .. }
            | GridError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GridError::ApiError(_) => ErrorSeverity::Medium,
            GridError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// One line suitable for printing straight to the terminal.
    pub fn user_friendly_message(&self) -> String {
        match self {
            GridError::UnknownTemplate { name } => format!(
                "'{}' is not a layout template (expected mainstat, attack, role or single)",
                name
            ),
            GridError::GridNotFound { name, path } => {
                format!("No hero grid named '{}' exists in {}", name, path)
            }
            GridError::EmptyStatsTable { bracket, target } => format!(
                "The stats service returned no usable win-rates for {} while building '{}'",
                bracket, target
            ),
            GridError::MalformedStatsInput { bracket, reason } => {
                format!("Stats for {} were malformed: {}", bracket, reason)
            }
            GridError::UnknownBracket { value } => format!(
                "'{}' is not a bracket (expected herald..immortal, pro, all or 0-9)",
                value
            ),
            GridError::ApiError(e) => format!("Could not reach the stats service: {}", e),
            GridError::IoError(e) => format!("File access failed: {}", e),
            GridError::SerializationError(e) => format!("Hero grid file is not valid JSON: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GridError::UnknownTemplate { .. } => "Pass --layout with one of: mainstat, attack, role, single",
            GridError::UnknownBracket { .. } => "Pass --brackets with bracket names or numbers, e.g. 'divine,immortal'",
            GridError::GridNotFound { .. } => {
                "Check the grid name in the game client, or generate one with --layout first"
            }
            GridError::EmptyStatsTable { .. } => "Try again later or pick a different bracket",
            GridError::MalformedStatsInput { .. } => {
                "The stats service format may have changed; please report this"
            }
            GridError::ApiError(_) => "Check your network connection and --api-endpoint",
            GridError::IoError(_) => "Check that the hero grid path exists and is writable",
            GridError::SerializationError(_) => {
                "Fix or remove the hero grid file so the game client can regenerate it"
            }
            GridError::ConfigError { .. }
            | GridError::ConfigValidationError { .. }
            | GridError::InvalidConfigValueError { .. } => {
                "Fix the value in ~/.odhg/config.toml or override it on the command line"
            }
            GridError::MissingConfigError { .. } => {
                "Pass --path pointing at hero_grid_config.json or set 'path' in ~/.odhg/config.toml"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, GridError>;
