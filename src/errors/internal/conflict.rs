use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConflictError {
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// Every sampled code was already taken
    #[error("Code space exhausted for prefix {prefix} after {attempts} attempts")]
    CodeSpaceExhausted { prefix: String, attempts: u32 },
}
