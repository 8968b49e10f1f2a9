use async_trait::async_trait;
use auth::Claims;

use super::errors::DirectoryError;
use super::errors::LoginError;
use super::models::AuthResult;
use super::models::Credentials;
use super::models::UserRecord;

/// Port for login operations.
#[async_trait]
pub trait LoginServicePort: Send + Sync + 'static {
    /// Authenticate credentials and issue a session token.
    ///
    /// Never fails outright: every outcome, including internal faults, is
    /// reported through the returned [`AuthResult`].
    ///
    /// # Arguments
    /// * `credentials` - Username and plaintext password
    ///
    /// # Returns
    /// `Authenticated` with token and user summary, or `Rejected` with
    /// `Validation`, `InvalidCredentials`, or `Internal`
    async fn authenticate(&self, credentials: Credentials) -> AuthResult;

    /// Verify a previously issued session token.
    ///
    /// # Arguments
    /// * `token` - Bearer token string
    ///
    /// # Returns
    /// Decoded claims, or None if the token is malformed, tampered with,
    /// expired, or issued by someone else
    fn validate_token(&self, token: &str) -> Option<Claims>;

    /// Hash a password for storage by registration flows.
    ///
    /// # Errors
    /// * `Internal` - Hashing failed
    async fn hash_password(&self, password: &str) -> Result<String, LoginError>;
}

/// Read access to stored user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Retrieve user by username.
    ///
    /// # Arguments
    /// * `username` - Exact username to look up
    ///
    /// # Returns
    /// Optional user record (None if not found)
    ///
    /// # Errors
    /// * `Unavailable` - Backend could not be queried
    async fn find_by_username(&self, username: &str)
        -> Result<Option<UserRecord>, DirectoryError>;
}
