//! MongoDB connection management for the back-office services.
//!
//! - [`MongoConfig`](crate::mongodb::MongoConfig) loads from the environment through `core_config::FromEnv`
//! - [`connect_from_config_with_retry`](crate::mongodb::connect_from_config_with_retry) dials with exponential backoff and jitter
//! - [`check_health`](crate::mongodb::check_health) backs the `/ready` endpoint
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::mongodb::{self, MongoConfig};
//!
//! let config = MongoConfig::from_env()?;
//! let client = mongodb::connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
