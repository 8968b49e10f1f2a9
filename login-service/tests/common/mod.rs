use std::sync::Arc;

use auth::Authenticator;
use auth::ManualClock;
use auth::PasswordCost;
use auth::PasswordHasher;
use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;
use login_service::directory::InMemoryUserDirectory;
use login_service::login::service::LoginService;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const TEST_ISSUER: &str = "task-attachments-app";

/// Login service over the demonstration directory, driven by a manual clock.
pub struct TestApp {
    pub service: LoginService<InMemoryUserDirectory>,
    pub authenticator: Arc<Authenticator>,
    pub clock: Arc<ManualClock>,
    pub started_at: DateTime<Utc>,
}

impl TestApp {
    pub fn spawn() -> Self {
        let started_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let clock = Arc::new(ManualClock::new(started_at));

        // Cheap parameters keep the suite fast; production cost is covered in auth
        let hasher = PasswordHasher::with_cost(PasswordCost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to build password hasher");

        let authenticator = Arc::new(
            Authenticator::new(TEST_SECRET, TEST_ISSUER)
                .with_password_hasher(hasher)
                .with_clock(clock.clone()),
        );

        let directory = InMemoryUserDirectory::with_demo_users(&authenticator)
            .expect("Failed to seed user directory");

        let service = LoginService::new(Arc::new(directory), Arc::clone(&authenticator))
            .expect("Failed to create login service");

        Self {
            service,
            authenticator,
            clock,
            started_at,
        }
    }
}
