use std::fmt;
use std::str::FromStr;

use auth::TokenSubject;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;

use super::errors::EmailError;
use super::errors::LoginError;

/// Stored user account.
///
/// Owned by the user directory; the login flow only reads it. The password
/// hash never leaves the service: responses carry a [`UserSummary`] instead.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: EmailAddress,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Identity embedded into session tokens for this user.
    pub fn token_subject(&self) -> TokenSubject {
        TokenSubject {
            user_id: self.id.0,
            username: self.username.clone(),
            email: self.email.as_str().to_string(),
        }
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Username and password submitted for a single login attempt.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check that both fields are present.
    ///
    /// # Errors
    /// * `Validation` - Username or password is empty
    pub fn validate(&self) -> Result<(), LoginError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(LoginError::missing_credentials());
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Public view of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&UserRecord> for UserSummary {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.0,
            username: user.username.clone(),
            email: user.email.as_str().to_string(),
        }
    }
}

/// Token and user returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: UserSummary,
}

/// Result of a login attempt.
///
/// Serializes as `{"success": bool, "token"?, "user"?, "error"?}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    Authenticated(AuthSession),
    Rejected(LoginError),
}

impl AuthResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthResult::Authenticated(_))
    }

    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            AuthResult::Authenticated(session) => Some(session),
            AuthResult::Rejected(_) => None,
        }
    }

    pub fn error(&self) -> Option<&LoginError> {
        match self {
            AuthResult::Authenticated(_) => None,
            AuthResult::Rejected(error) => Some(error),
        }
    }
}

impl From<Result<AuthSession, LoginError>> for AuthResult {
    fn from(result: Result<AuthSession, LoginError>) -> Self {
        match result {
            Ok(session) => AuthResult::Authenticated(session),
            Err(error) => AuthResult::Rejected(error),
        }
    }
}

#[derive(Serialize)]
struct AuthResponseBody<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Serialize for AuthResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match self {
            AuthResult::Authenticated(session) => AuthResponseBody {
                success: true,
                token: Some(&session.token),
                user: Some(&session.user),
                error: None,
            },
            AuthResult::Rejected(error) => AuthResponseBody {
                success: false,
                token: None,
                user: None,
                error: Some(error.to_string()),
            },
        };
        body.serialize(serializer)
    }
}
