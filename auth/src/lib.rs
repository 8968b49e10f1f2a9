//! Authentication utilities library
//!
//! Provides reusable authentication infrastructure:
//! - Password hashing (Argon2id, tunable cost)
//! - Session token issuance and verification (HS256 JWT)
//! - Authentication coordination
//!
//! Services define their own user storage and error surfaces and adapt
//! these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{JwtHandler, TokenSubject};
//! use chrono::Duration;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!", "my-service");
//! let subject = TokenSubject {
//!     user_id: 1,
//!     username: "alice".to_string(),
//!     email: "alice@example.com".to_string(),
//! };
//! let token = handler.issue(&subject, Duration::hours(1)).unwrap();
//! let claims = handler.decode(&token).unwrap();
//! assert_eq!(claims.user_id, 1);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, TokenSubject};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", "my-service");
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let subject = TokenSubject {
//!     user_id: 1,
//!     username: "alice".to_string(),
//!     email: "alice@example.com".to_string(),
//! };
//! let result = auth.authenticate("password123", &hash, &subject).unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(claims.username, "alice");
//! ```

pub mod authenticator;
pub mod clock;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use authenticator::DEFAULT_TOKEN_TTL_HOURS;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenSubject;
pub use password::PasswordCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
