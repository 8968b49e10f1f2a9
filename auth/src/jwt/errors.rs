use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token lifetime out of range: {0}")]
    InvalidLifetime(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token issuer is not accepted")]
    InvalidIssuer,

    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    #[error("Token claims are invalid: {0}")]
    InvalidClaims(String),
}
