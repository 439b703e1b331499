/// Startup and configuration failures
///
/// These never reach HTTP clients; they abort startup or a CLI command.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),

    #[error("Invalid setting '{setting_name}': {reason}")]
    InvalidSetting { setting_name: String, reason: String },

    #[error("Failed to parse setting '{setting_name}': {error}")]
    ParseError { setting_name: String, error: String },

    #[error("Required secret '{secret_name}' is missing")]
    MissingSecret { secret_name: String },

    #[error("Secret '{secret_name}' must be at least {expected} characters, got {actual}")]
    InvalidSecretLength {
        secret_name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Startup failed: {0}")]
    Internal(#[from] crate::errors::InternalError),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] crate::config::logging::LoggingError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApplicationError {
    pub fn invalid_setting(setting_name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            setting_name: setting_name.to_string(),
            reason: reason.into(),
        }
    }
}
