use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Claims;
use auth::PasswordError;

use super::errors::LoginError;
use super::models::AuthResult;
use super::models::AuthSession;
use super::models::Credentials;
use super::models::UserSummary;
use super::ports::LoginServicePort;
use super::ports::UserDirectory;

/// Password verified for unknown usernames so both rejection paths cost one hash.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-users";

/// Domain service implementation for login operations.
///
/// Concrete implementation of LoginServicePort with dependency injection.
/// Password hashing and verification run on the blocking thread pool.
pub struct LoginService<UD>
where
    UD: UserDirectory,
{
    directory: Arc<UD>,
    authenticator: Arc<Authenticator>,
    decoy_hash: Arc<str>,
}

impl<UD> LoginService<UD>
where
    UD: UserDirectory,
{
    /// Create a new login service with injected dependencies.
    ///
    /// Hashes a decoy password once, using the authenticator's cost, so
    /// rejected unknown usernames take as long as wrong passwords.
    ///
    /// # Arguments
    /// * `directory` - User lookup implementation
    /// * `authenticator` - Password verification and token issuance
    ///
    /// # Errors
    /// * `PasswordError` - Decoy hash could not be produced
    pub fn new(
        directory: Arc<UD>,
        authenticator: Arc<Authenticator>,
    ) -> Result<Self, PasswordError> {
        let decoy_hash = authenticator.hash_password(DECOY_PASSWORD)?;

        Ok(Self {
            directory,
            authenticator,
            decoy_hash: Arc::from(decoy_hash),
        })
    }

    async fn try_authenticate(
        &self,
        credentials: Credentials,
    ) -> Result<AuthSession, LoginError> {
        credentials.validate()?;
        let Credentials { username, password } = credentials;

        let record = self
            .directory
            .find_by_username(&username)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "User directory lookup failed");
                LoginError::Internal
            })?;

        let authenticator = Arc::clone(&self.authenticator);

        let Some(record) = record else {
            let decoy_hash = Arc::clone(&self.decoy_hash);
            // Outcome is irrelevant, only the cost matters
            let _ = run_blocking(move || authenticator.verify_password(&password, &decoy_hash))
                .await?;
            tracing::debug!("Login rejected: unknown username");
            return Err(LoginError::InvalidCredentials);
        };

        let subject = record.token_subject();
        let stored_hash = record.password_hash.clone();
        let result =
            run_blocking(move || authenticator.authenticate(&password, &stored_hash, &subject))
                .await?;

        match result {
            Ok(authenticated) => {
                tracing::info!(user_id = %record.id, "User authenticated");
                Ok(AuthSession {
                    token: authenticated.access_token,
                    user: UserSummary::from(&record),
                })
            }
            Err(AuthenticationError::InvalidCredentials) => {
                tracing::debug!(user_id = %record.id, "Login rejected: wrong password");
                Err(LoginError::InvalidCredentials)
            }
            Err(AuthenticationError::PasswordError(e)) => {
                tracing::error!(user_id = %record.id, error = %e, "Password verification failed");
                Err(LoginError::Internal)
            }
            Err(AuthenticationError::JwtError(e)) => {
                tracing::error!(user_id = %record.id, error = %e, "Token generation failed");
                Err(LoginError::Internal)
            }
        }
    }
}

#[async_trait]
impl<UD> LoginServicePort for LoginService<UD>
where
    UD: UserDirectory,
{
    async fn authenticate(&self, credentials: Credentials) -> AuthResult {
        self.try_authenticate(credentials).await.into()
    }

    fn validate_token(&self, token: &str) -> Option<Claims> {
        match self.authenticator.validate_token(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::warn!(error = %e, "JWT validation failed");
                None
            }
        }
    }

    async fn hash_password(&self, password: &str) -> Result<String, LoginError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_owned();

        run_blocking(move || authenticator.hash_password(&password))
            .await?
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                LoginError::Internal
            })
    }
}

/// Run CPU-bound work off the async executor.
async fn run_blocking<F, T>(work: F) -> Result<T, LoginError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        tracing::error!(error = %e, "Blocking task failed");
        LoginError::Internal
    })
}

#[cfg(test)]
mod tests {
    use auth::PasswordCost;
    use auth::PasswordHasher;
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::login::errors::DirectoryError;
    use crate::domain::login::models::EmailAddress;
    use crate::domain::login::models::UserId;
    use crate::domain::login::models::UserRecord;

    mock! {
        pub TestUserDirectory {}

        #[async_trait]
        impl UserDirectory for TestUserDirectory {
            async fn find_by_username(
                &self,
                username: &str,
            ) -> Result<Option<UserRecord>, DirectoryError>;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        let hasher = PasswordHasher::with_cost(PasswordCost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();

        Arc::new(
            Authenticator::new(b"test-secret-key-for-jwt-signing-at-least-32-bytes", "test")
                .with_password_hasher(hasher),
        )
    }

    fn record(authenticator: &Authenticator, password_hash: Option<String>) -> UserRecord {
        UserRecord {
            id: UserId(1),
            username: "admin".to_string(),
            email: EmailAddress::new("admin@example.com".to_string()).unwrap(),
            password_hash: password_hash
                .unwrap_or_else(|| authenticator.hash_password("password123").unwrap()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let authenticator = authenticator();
        let mut directory = MockTestUserDirectory::new();

        let returned = record(&authenticator, None);
        directory
            .expect_find_by_username()
            .withf(|username| username == "admin")
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        let service = LoginService::new(Arc::new(directory), authenticator).unwrap();

        let result = service
            .authenticate(Credentials::new("admin", "password123"))
            .await;

        let session = result.session().expect("Expected successful login");
        assert_eq!(session.user.id, 1);
        assert_eq!(session.user.email, "admin@example.com");

        let claims = service.validate_token(&session.token).unwrap();
        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.username, "admin");
    }

    #[tokio::test]
    async fn test_validation_error_skips_directory() {
        let mut directory = MockTestUserDirectory::new();
        directory.expect_find_by_username().times(0);

        let service = LoginService::new(Arc::new(directory), authenticator()).unwrap();

        let result = service.authenticate(Credentials::new("", "password123")).await;
        assert_eq!(
            result.error(),
            Some(&LoginError::Validation(
                "Username and password are required".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_unknown_user_is_invalid_credentials() {
        let mut directory = MockTestUserDirectory::new();
        directory
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = LoginService::new(Arc::new(directory), authenticator()).unwrap();

        let result = service.authenticate(Credentials::new("ghost", "x")).await;
        assert_eq!(result, AuthResult::Rejected(LoginError::InvalidCredentials));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_rejected_logins_do_not_log_credentials() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let authenticator = authenticator();
        let mut directory = MockTestUserDirectory::new();
        let returned = record(&authenticator, None);
        directory
            .expect_find_by_username()
            .returning(move |username| {
                Ok((username == "admin").then(|| returned.clone()))
            });

        let service = LoginService::new(Arc::new(directory), authenticator).unwrap();

        let unknown = service
            .authenticate(Credentials::new("MyS3cretPassw0rd", "x"))
            .await;
        let wrong = service
            .authenticate(Credentials::new("admin", "wrong-password-typed"))
            .await;
        assert_eq!(unknown, wrong);

        let output = logs.contents();
        assert!(output.contains("Login rejected: unknown username"));
        assert!(output.contains("Login rejected: wrong password"));
        assert!(!output.contains("MyS3cretPassw0rd"));
        assert!(!output.contains("wrong-password-typed"));
    }

    #[tokio::test]
    async fn test_directory_fault_is_internal_error() {
        let mut directory = MockTestUserDirectory::new();
        directory
            .expect_find_by_username()
            .times(1)
            .returning(|_| Err(DirectoryError::Unavailable("connection refused".to_string())));

        let service = LoginService::new(Arc::new(directory), authenticator()).unwrap();

        let result = service
            .authenticate(Credentials::new("admin", "password123"))
            .await;
        assert_eq!(result, AuthResult::Rejected(LoginError::Internal));

        // Fault detail stays out of the response
        let body = serde_json::to_string(&result).unwrap();
        assert!(!body.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_corrupt_stored_hash_is_internal_error() {
        let authenticator = authenticator();
        let mut directory = MockTestUserDirectory::new();

        let returned = record(&authenticator, Some("not-a-phc-string".to_string()));
        directory
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        let service = LoginService::new(Arc::new(directory), authenticator).unwrap();

        let result = service
            .authenticate(Credentials::new("admin", "password123"))
            .await;
        assert_eq!(result, AuthResult::Rejected(LoginError::Internal));
    }

    #[tokio::test]
    async fn test_hash_password_round_trip() {
        let directory = MockTestUserDirectory::new();
        let authenticator = authenticator();
        let service = LoginService::new(Arc::new(directory), Arc::clone(&authenticator)).unwrap();

        let hash = service.hash_password("s3cret").await.unwrap();
        assert!(authenticator.verify_password("s3cret", &hash).unwrap());
        assert!(!authenticator.verify_password("s3cre", &hash).unwrap());
    }

    #[test]
    fn test_validate_token_rejects_garbage() {
        let directory = MockTestUserDirectory::new();
        let service = LoginService::new(Arc::new(directory), authenticator()).unwrap();

        assert!(service.validate_token("invalid.token.here").is_none());
        assert!(service.validate_token("").is_none());
    }
}
