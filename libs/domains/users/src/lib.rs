//! Users Domain
//!
//! User accounts and login for the back office.
//!
//! # Features
//!
//! - User CRUD with unique, lowercased emails
//! - Password hashing with Argon2 and password change
//! - Login issuing a JWT, guarded by a failed-attempt throttle
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /api/users and /api/authentication
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌───────────────┐
//! │  Services   │ ──▶ │ LoginThrottle │ ← AttemptStore (in-memory)
//! └──────┬──────┘     └───────────────┘
//!        │
//! ┌──────▼──────┐
//! │  Accessor   │  ← listing::EntityAccessor (MongoDB or in-memory)
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_users::{handlers, mongodb, AuthService, LoginThrottle, ThrottleConfig, UserService};
//!
//! let users = UserService::new(mongodb::user_accessor(&db).await?);
//! let throttle = LoginThrottle::in_memory(ThrottleConfig::from_env()?);
//! let auth = AuthService::new(users.clone(), throttle, jwt);
//!
//! let router = handlers::router(users);
//! let login = handlers::auth_router(auth);
//! ```

pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod password;
pub mod service;
pub mod throttle;

pub use auth::AuthService;
pub use error::{UserError, UserResult};
pub use handlers::{ApiDoc, AuthApiDoc};
pub use models::{
    ChangePassword, CreateUser, LoginRequest, LoginResponse, USER_FIELDS, UpdateUser, User,
    UserResponse,
};
pub use service::UserService;
pub use throttle::{
    AttemptRecord, AttemptStore, Clock, InMemoryAttemptStore, LoginThrottle, SystemClock,
    ThrottleConfig,
};
