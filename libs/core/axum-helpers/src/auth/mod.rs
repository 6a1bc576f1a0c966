//! Stateless bearer-token authentication.
//!
//! Login issues an HS256 JWT through [`JwtAuth::create_access_token`];
//! [`jwt_auth_middleware`] guards the protected routers and exposes the
//! decoded [`JwtClaims`] to handlers as a request extension.
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let protected = Router::new()
//!     .nest("/products", products_router)
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{JwtAuth, JwtClaims};
pub use middleware::jwt_auth_middleware;
