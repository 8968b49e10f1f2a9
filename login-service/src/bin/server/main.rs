use std::io::BufRead;
use std::sync::Arc;

use anyhow::Context;
use auth::Authenticator;
use auth::PasswordHasher;
use chrono::Duration;
use login_service::config::Config;
use login_service::directory::InMemoryUserDirectory;
use login_service::login::models::Credentials;
use login_service::login::ports::LoginServicePort;
use login_service::login::service::LoginService;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "login_service=debug,auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        service = "login-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        issuer = %config.jwt.issuer,
        "Configuration loaded"
    );

    let password_hasher = PasswordHasher::with_cost(config.password.cost())?;
    let cost = password_hasher.cost();
    let token_ttl = Duration::try_hours(config.jwt.expiration_hours)
        .context("jwt.expiration_hours is out of range")?;
    let authenticator = Arc::new(
        Authenticator::new(config.jwt.secret.as_bytes(), config.jwt.issuer.clone())
            .with_password_hasher(password_hasher)
            .with_token_ttl(token_ttl),
    );
    tracing::info!(
        token_ttl_hours = authenticator.token_ttl().num_hours(),
        memory_kib = cost.memory_kib,
        iterations = cost.iterations,
        parallelism = cost.parallelism,
        "Authenticator ready"
    );

    let seeding_authenticator = Arc::clone(&authenticator);
    let directory = tokio::task::spawn_blocking(move || {
        InMemoryUserDirectory::with_demo_users(&seeding_authenticator)
    })
    .await??;
    tracing::info!(users = directory.len(), "User directory seeded");

    let login_service = {
        let authenticator = Arc::clone(&authenticator);
        tokio::task::spawn_blocking(move || LoginService::new(Arc::new(directory), authenticator))
            .await??
    };

    let username = std::env::args()
        .nth(1)
        .context("usage: login-service <username> (password is read from stdin)")?;
    let password = read_password()?;

    let result = login_service
        .authenticate(Credentials::new(username, password))
        .await;

    if let Some(session) = result.session() {
        if let Some(claims) = login_service.validate_token(&session.token) {
            tracing::info!(
                user_id = claims.user_id,
                issuer = %claims.iss,
                expires_at = ?claims.expires_at(),
                "Issued token verified"
            );
        }
    }

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

fn read_password() -> Result<String, anyhow::Error> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
