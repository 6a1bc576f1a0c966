use axum_helpers::JwtConfig;
use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_products::SeedConfig;
use domain_users::ThrottleConfig;

pub use core_config::Environment;

/// Application configuration, composed from the shared config sections.
/// Not `Debug`: it carries the JWT secret.
#[derive(Clone)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    pub jwt: JwtConfig,
    pub throttle: ThrottleConfig,
    pub seed: SeedConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            mongodb: MongoConfig::from_env()?.with_app_name(env!("CARGO_PKG_NAME")),
            jwt: JwtConfig::from_env()?,
            throttle: ThrottleConfig::from_env()?,
            seed: SeedConfig::from_env()?,
        })
    }
}
