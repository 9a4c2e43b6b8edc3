use serde::Serialize;
use thiserror::Error;

/// Unified error type for the migration tool.
///
/// Serializes to JSON so `--format json` callers get structured errors.
#[derive(Error, Debug, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    #[error("Config error: {message}")]
    Config { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String, path: String },
}

impl AppError {
    /// Create a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a Not Found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a Parse error for a specific source file
    pub fn parse(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Check if this error must abort the whole run.
    ///
    /// Fatal errors happen before any output is produced (bad config, missing
    /// source root). Everything else is recorded against a single file or unit.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Config { .. } | Self::NotFound { .. } => true,
            Self::Io { .. } | Self::Parse { .. } => false,
        }
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        use crate::config::ConfigError;
        match err {
            ConfigError::Missing(path) => AppError::not_found(format!("config file {path}")),
            ConfigError::SourceRootMissing(path) => {
                AppError::not_found(format!("source root {path}"))
            }
            ConfigError::Io(e) => AppError::config(format!("IO: {e}")),
            ConfigError::Json(e) => AppError::config(format!("JSON: {e}")),
            ConfigError::Exclude(e) => AppError::config(format!("exclude pattern: {e}")),
        }
    }
}

impl From<crate::convert::ConvertError> for AppError {
    fn from(err: crate::convert::ConvertError) -> Self {
        use crate::convert::ConvertError;
        match err {
            ConvertError::Io(e) => AppError::io(e.to_string()),
            ConvertError::Json(e) => AppError::io(format!("JSON: {e}")),
            ConvertError::NoClass(path) => AppError::parse("no class declaration found", path),
            ConvertError::Utf8(path) => AppError::parse("file is not valid UTF-8", path),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::io(err.to_string())
    }
}

impl From<AppError> for String {
    fn from(err: AppError) -> Self {
        err.to_string()
    }
}
