use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VacancyError {
    #[error("Validation error on `{field}`: {message}")]
    Validation { field: String, message: String },

    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    #[error("Store I/O error at {}: {source}", .path.display())]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("API returned status {status} for {url}")]
    ApiStatus { status: u16, url: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value `{value}` for `{field}`: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl VacancyError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn store_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StoreIo {
            path: path.into(),
            source,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation { .. } => ErrorSeverity::Low,
            Self::Api(_) | Self::ApiStatus { .. } => ErrorSeverity::Medium,
            Self::MalformedInput { .. }
            | Self::Serialization(_)
            | Self::Config { .. }
            | Self::InvalidConfigValue { .. }
            | Self::MissingConfig { .. } => ErrorSeverity::High,
            Self::StoreIo { .. } => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for the binary.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, VacancyError>;
