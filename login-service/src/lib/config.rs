use std::env;
use std::fmt;

use auth::PasswordCost;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Run mode in which a missing signing secret is tolerated.
pub const DEVELOPMENT_MODE: &str = "development";

/// Signing secret used only when running in development without JWT_SECRET.
pub const DEVELOPMENT_JWT_SECRET: &str = "development-only-jwt-secret-do-not-deploy";

/// Hardcoded fallback of earlier deployments; never accepted outside development.
const LEGACY_DEFAULT_SECRET: &str = "default-secret-key";

/// HS256 keys shorter than the hash output weaken the signature.
const MIN_SECRET_BYTES: usize = 32;

const DEFAULT_ISSUER: &str = "task-attachments-app";

/// Longest accepted session token lifetime (one year).
pub const MAX_EXPIRATION_HOURS: i64 = 24 * 366;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    #[serde(default)]
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl JwtConfig {
    /// Check that the token lifetime is positive and at most one year.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expiration_hours <= 0 || self.expiration_hours > MAX_EXPIRATION_HOURS {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_hours must be between 1 and {}, got {}",
                MAX_EXPIRATION_HOURS, self.expiration_hours
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("expiration_hours", &self.expiration_hours)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Argon2id cost parameters for newly hashed passwords.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl PasswordConfig {
    pub fn cost(&self) -> PasswordCost {
        PasswordCost {
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. JWT_SECRET
    /// 2. Environment variables (APP__JWT__ISSUER, APP__PASSWORD__MEMORY_KIB, etc.)
    /// 3. Environment-specific config file (config/{RUN_MODE}.toml)
    /// 4. Default config file (config/default.toml)
    /// 5. Built-in defaults
    ///
    /// Fails unless a strong signing secret is configured, except in the
    /// development run mode.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| DEVELOPMENT_MODE.to_string());
        let jwt_secret = env::var("JWT_SECRET").ok();

        Self::load_with(&run_mode, jwt_secret)
    }

    /// Load configuration for an explicit run mode and secret.
    pub fn load_with(run_mode: &str, jwt_secret: Option<String>) -> Result<Self, ConfigError> {
        let default_cost = PasswordCost::default();

        let configuration = ConfigBuilder::builder()
            .set_default("jwt.expiration_hours", auth::DEFAULT_TOKEN_TTL_HOURS)?
            .set_default("jwt.issuer", DEFAULT_ISSUER)?
            .set_default("password.memory_kib", i64::from(default_cost.memory_kib))?
            .set_default("password.iterations", i64::from(default_cost.iterations))?
            .set_default("password.parallelism", i64::from(default_cost.parallelism))?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: APP__JWT__ISSUER=my-app overrides jwt.issuer
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_override_option("jwt.secret", jwt_secret)?
            .build()?;

        let mut config: Config = configuration.try_deserialize()?;

        config.jwt.validate()?;

        config.jwt.secret = resolve_secret(run_mode, std::mem::take(&mut config.jwt.secret))?;

        Ok(config)
    }
}

fn resolve_secret(run_mode: &str, secret: String) -> Result<String, ConfigError> {
    if run_mode == DEVELOPMENT_MODE {
        if secret.is_empty() {
            tracing::warn!(
                run_mode,
                "JWT_SECRET is not set; using the development-only signing secret"
            );
            return Ok(DEVELOPMENT_JWT_SECRET.to_string());
        }
        return Ok(secret);
    }

    if secret.is_empty() {
        return Err(ConfigError::Message(format!(
            "JWT_SECRET must be set when RUN_MODE is '{}'",
            run_mode
        )));
    }

    if secret == LEGACY_DEFAULT_SECRET || secret == DEVELOPMENT_JWT_SECRET {
        return Err(ConfigError::Message(
            "JWT_SECRET is a well-known default and cannot be used outside development"
                .to_string(),
        ));
    }

    if secret.len() < MIN_SECRET_BYTES {
        return Err(ConfigError::Message(format!(
            "JWT_SECRET must be at least {} bytes, got {}",
            MIN_SECRET_BYTES,
            secret.len()
        )));
    }

    Ok(secret)
}
