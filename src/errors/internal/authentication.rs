use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthenticationError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {reason}")]
    InvalidToken { reason: String },

    #[error("Expired token")]
    ExpiredToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token was valid but its subject no longer exists
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i32 },
}

impl AuthenticationError {
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }
}
