use crate::errors::internal::{
    AuthenticationError, AuthorizationError, ConflictError, InternalError, ValidationError,
};
use poem_openapi::{ApiResponse, Object, payload::Json};
use std::fmt;

/// Standardized error response body
#[derive(Object, Debug)]
pub struct ErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// A single rejected field for form display
#[derive(Object, Debug)]
pub struct FieldErrorResponse {
    pub field: String,
    pub message: String,
}

/// Validation error body with one entry per rejected field
#[derive(Object, Debug)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    pub fields: Vec<FieldErrorResponse>,
}

/// Error type returned by every endpoint
#[derive(ApiResponse, Debug)]
pub enum ApiError {
    /// Missing, malformed or expired bearer token, or bad credentials
    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    /// Permission or visibility check failed
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// Input rejected before any mutation
    #[oai(status = 400)]
    ValidationFailed(Json<ValidationErrorResponse>),

    /// Row missing or outside the requester's scope
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    /// Uniqueness violation
    #[oai(status = 409)]
    Conflict(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

impl ApiError {
    pub fn unauthorized(error: &str, message: &str) -> Self {
        ApiError::Unauthorized(Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
            status_code: 401,
        }))
    }

    /// Create a Forbidden error
    ///
    /// The message is always generic so a denial leaks nothing about the
    /// resource or the requester's scope.
    pub fn forbidden() -> Self {
        ApiError::Forbidden(Json(ErrorResponse {
            error: "forbidden".to_string(),
            message: "You are not authorized to perform this action".to_string(),
            status_code: 403,
        }))
    }

    pub fn validation_failed(err: ValidationError) -> Self {
        ApiError::ValidationFailed(Json(ValidationErrorResponse {
            error: "validation_failed".to_string(),
            message: "One or more fields are invalid".to_string(),
            status_code: 400,
            fields: err
                .fields
                .into_iter()
                .map(|f| FieldErrorResponse {
                    field: f.field,
                    message: f.message,
                })
                .collect(),
        }))
    }

    pub fn not_found() -> Self {
        ApiError::NotFound(Json(ErrorResponse {
            error: "not_found".to_string(),
            message: "The requested resource was not found".to_string(),
            status_code: 404,
        }))
    }

    pub fn conflict(error: &str, message: &str) -> Self {
        ApiError::Conflict(Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
            status_code: 409,
        }))
    }

    /// Create a generic internal server error
    ///
    /// Always returns a generic message without exposing internal details.
    pub fn internal_server_error() -> Self {
        ApiError::InternalError(Json(ErrorResponse {
            error: "internal_error".to_string(),
            message: "An internal error occurred".to_string(),
            status_code: 500,
        }))
    }

    /// Convert InternalError to ApiError
    ///
    /// This is the explicit conversion point from internal errors to API errors.
    /// Internal error details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match err {
            // Infrastructure errors - always log and return generic error
            InternalError::Database(ref db_err) => {
                tracing::error!("Database failure: {}", db_err);
                Self::internal_server_error()
            }
            InternalError::Crypto { ref operation, .. } => {
                tracing::error!("Crypto error in {}: {}", operation, err);
                Self::internal_server_error()
            }
            InternalError::Export(ref message) => {
                tracing::error!("Export rendering failed: {}", message);
                Self::internal_server_error()
            }

            // Domain errors - convert to specific API errors
            InternalError::Authentication(auth_err) => {
                tracing::debug!("Authentication rejected: {}", auth_err);
                match auth_err {
                    AuthenticationError::MissingToken => {
                        Self::unauthorized("missing_token", "Authorization header is required")
                    }
                    AuthenticationError::ExpiredToken => {
                        Self::unauthorized("expired_token", "Token has expired")
                    }
                    AuthenticationError::InvalidCredentials => {
                        Self::unauthorized("invalid_credentials", "Invalid email or password")
                    }
                    AuthenticationError::InvalidToken { .. }
                    | AuthenticationError::UserNotFound { .. } => {
                        Self::unauthorized("invalid_token", "Invalid or malformed token")
                    }
                }
            }
            InternalError::Authorization(authz_err) => {
                match &authz_err {
                    AuthorizationError::UnrecognizedRole(_)
                    | AuthorizationError::MissingRole
                    | AuthorizationError::MissingHierarchyCode { .. } => {
                        tracing::warn!("Visibility scope rejected: {}", authz_err);
                    }
                    AuthorizationError::PermissionDenied { .. }
                    | AuthorizationError::OutOfScope { .. } => {
                        tracing::warn!("Authorization denied: {}", authz_err);
                    }
                }
                Self::forbidden()
            }
            InternalError::Validation(validation) => {
                tracing::debug!("{}", validation);
                Self::validation_failed(validation)
            }
            InternalError::NotFound { entity, id } => {
                tracing::debug!("{} {} not found or out of scope", entity, id);
                Self::not_found()
            }
            InternalError::Conflict(conflict) => match conflict {
                ConflictError::DuplicateEmail(email) => {
                    tracing::warn!("Duplicate email registration attempt: {}", email);
                    Self::conflict("duplicate_email", "Email is already registered")
                }
                ConflictError::CodeSpaceExhausted { prefix, attempts } => {
                    tracing::error!(
                        "Code generation for {} exhausted after {} attempts",
                        prefix,
                        attempts
                    );
                    Self::conflict("code_exhausted", "Could not allocate a unique code")
                }
            },
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthorized(json)
            | ApiError::Forbidden(json)
            | ApiError::NotFound(json)
            | ApiError::Conflict(json)
            | ApiError::InternalError(json) => json.0.message.clone(),
            ApiError::ValidationFailed(json) => json.0.message.clone(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Unauthorized(json)
            | ApiError::Forbidden(json)
            | ApiError::NotFound(json)
            | ApiError::Conflict(json)
            | ApiError::InternalError(json) => json.0.status_code,
            ApiError::ValidationFailed(json) => json.0.status_code,
        }
    }
}

impl From<InternalError> for ApiError {
    fn from(err: InternalError) -> Self {
        ApiError::from_internal_error(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
