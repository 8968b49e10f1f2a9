use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::Error as JsonWebTokenError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Serialize;
use serde_json::error::Category;

use super::claims::Claims;
use super::claims::TokenSubject;
use super::errors::JwtError;
use crate::clock::Clock;
use crate::clock::SystemClock;

/// JWT token handler for issuing and verifying session tokens.
///
/// Uses HS256 (HMAC with SHA-256). Tokens are standard three-segment JWTs,
/// so any compliant verifier holding the secret can check them.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    clock: Arc<dyn Clock>,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    /// * `issuer` - Issuer tag stamped into and required from every token
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm and the system clock
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8], issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            issuer: issuer.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source used for issuance and expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Encode arbitrary claims into a signed JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Issue a session token for a subject.
    ///
    /// # Arguments
    /// * `subject` - User the token identifies
    /// * `ttl` - Lifetime; the token expires at now + ttl
    ///
    /// # Returns
    /// Signed JWT token string
    ///
    /// # Errors
    /// * `InvalidLifetime` - now + ttl overflows the timestamp range
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, subject: &TokenSubject, ttl: Duration) -> Result<String, JwtError> {
        let claims = Claims::for_subject(subject, self.issuer.clone(), self.clock.now(), ttl)?;
        self.encode(&claims)
    }

    /// Verify and decode a session token.
    ///
    /// Checks run in order: signature, expiry, then issuer and claim shape.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `Malformed` - Token is not a well-formed JWT
    /// * `BadSignature` - Signature does not match the payload
    /// * `TokenExpired` - Current time is past the exp claim
    /// * `InvalidIssuer` - iss claim is not this handler's issuer
    /// * `MissingClaim` / `InvalidClaims` - Payload lacks a required field
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against the injected clock
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.set_issuer(&[self.issuer.as_str()]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(classify_error)?;

        let claims = token_data.claims;
        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}

fn classify_error(error: JsonWebTokenError) -> JwtError {
    match error.kind() {
        ErrorKind::InvalidSignature => JwtError::BadSignature,
        ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        ErrorKind::MissingRequiredClaim(claim) => JwtError::MissingClaim(claim.clone()),
        ErrorKind::Json(err) if err.classify() == Category::Data => {
            JwtError::InvalidClaims(err.to_string())
        }
        _ => JwtError::Malformed(error.to_string()),
    }
}
