//! JWT settings, loaded through `core_config::FromEnv` like every other
//! config section.

use core_config::{ConfigError, FromEnv, env_parse, env_required};

const MIN_SECRET_LEN: usize = 32;
const DEFAULT_TTL_MINUTES: i64 = 60;

/// JWT authentication configuration.
///
/// - `JWT_SECRET` (required), at least 32 characters
/// - `JWT_TTL_MINUTES` (optional), access token lifetime, default 60
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

impl JwtConfig {
    /// Build a config by hand, applying the same length rule as `from_env`.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        check_secret(&secret)?;
        Ok(Self {
            secret,
            ttl_minutes: DEFAULT_TTL_MINUTES,
        })
    }
}

fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least {MIN_SECRET_LEN} characters (got {}). Generate one with: openssl rand -base64 32",
                secret.len()
            ),
        });
    }
    Ok(())
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        check_secret(&secret)?;
        let ttl_minutes = env_parse("JWT_TTL_MINUTES", DEFAULT_TTL_MINUTES)?;

        Ok(Self {
            secret,
            ttl_minutes,
        })
    }
}
