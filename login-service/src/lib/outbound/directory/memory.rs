use std::collections::HashMap;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;

use crate::domain::login::errors::DirectoryError;
use crate::domain::login::models::EmailAddress;
use crate::domain::login::models::UserId;
use crate::domain::login::models::UserRecord;
use crate::domain::login::ports::UserDirectory;

/// Read-only user directory held in memory.
///
/// Records are fixed at construction, so concurrent lookups need no locking.
pub struct InMemoryUserDirectory {
    users: HashMap<String, UserRecord>,
}

impl InMemoryUserDirectory {
    /// Build a directory from records, keyed by exact username.
    ///
    /// Later records replace earlier ones with the same username.
    pub fn new(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let users = records
            .into_iter()
            .map(|record| (record.username.clone(), record))
            .collect();

        Self { users }
    }

    /// Directory seeded with the demonstration accounts.
    ///
    /// | id | username | password      | email             |
    /// |----|----------|---------------|-------------------|
    /// | 1  | admin    | password123   | admin@example.com |
    /// | 2  | user     | userpass      | user@example.com  |
    ///
    /// Passwords are hashed with the authenticator's configured cost, so this
    /// is CPU-heavy and belongs on a blocking thread.
    ///
    /// # Errors
    /// * `InvalidRecord` - A seed record could not be built
    pub fn with_demo_users(authenticator: &Authenticator) -> Result<Self, DirectoryError> {
        let seeds = [
            (1, "admin", "admin@example.com", "password123", 1),
            (2, "user", "user@example.com", "userpass", 2),
        ];

        let records = seeds
            .into_iter()
            .map(|(id, username, email, password, day)| -> Result<UserRecord, DirectoryError> {
                let password_hash = authenticator.hash_password(password).map_err(|e| {
                    DirectoryError::InvalidRecord(format!("Password hashing failed: {}", e))
                })?;

                Ok(UserRecord {
                    id: UserId(id),
                    username: username.to_string(),
                    email: EmailAddress::new(email.to_string())?,
                    password_hash,
                    created_at: january_2024(day)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn january_2024(day: u32) -> Result<DateTime<Utc>, DirectoryError> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0)
        .single()
        .ok_or_else(|| DirectoryError::InvalidRecord(format!("Invalid creation day: {}", day)))
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(self.users.get(username).cloned())
    }
}
