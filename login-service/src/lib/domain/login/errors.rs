use thiserror::Error;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error raised by a user directory backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("User directory unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid user record: {0}")]
    InvalidRecord(String),
}

impl From<EmailError> for DirectoryError {
    fn from(err: EmailError) -> Self {
        DirectoryError::InvalidRecord(err.to_string())
    }
}

/// Outcome of a rejected login, as reported to the caller.
///
/// Messages are deliberately coarse. `InvalidCredentials` covers both an
/// unknown username and a wrong password, and `Internal` never carries the
/// underlying fault, which is only logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Internal server error")]
    Internal,
}

impl LoginError {
    pub fn missing_credentials() -> Self {
        LoginError::Validation("Username and password are required".to_string())
    }
}
