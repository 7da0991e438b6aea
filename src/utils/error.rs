use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsuranceError {
    #[error("Car {car_id} not found")]
    CarNotFound { car_id: i64 },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Input,
    Storage,
    Configuration,
    System,
}

impl InsuranceError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CarNotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidInput { .. } => ErrorCategory::Input,
            Self::Storage { .. } => ErrorCategory::Storage,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CarNotFound { .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::CarNotFound { car_id } => format!("Car {} not found", car_id),
            Self::InvalidInput { field, message } => format!("Invalid {}: {}", field, message),
            Self::Storage { .. } | Self::IoError(_) | Self::SerializationError(_) => {
                "Internal storage failure".to_string()
            }
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            Self::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
        }
    }
}

impl From<rusqlite::Error> for InsuranceError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InsuranceError>;
