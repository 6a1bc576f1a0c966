use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use listing::ListingError;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Wrong email or password")]
    InvalidCredentials,

    #[error("Wrong password")]
    WrongPassword,

    #[error("Too many failed login attempts. Please try again after {minutes} minutes.")]
    RateLimited { minutes: u32 },

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error(transparent)]
    Listing(#[from] ListingError),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            UserError::DuplicateEmail(email) => {
                AppError::Conflict(format!("User with email '{}' already exists", email))
            }
            err @ (UserError::InvalidCredentials | UserError::WrongPassword) => {
                AppError::Unauthorized(err.to_string())
            }
            err @ UserError::RateLimited { .. } => AppError::TooManyRequests(err.to_string()),
            UserError::Validation(errors) => AppError::ValidationError(errors),
            UserError::PasswordHash(msg) | UserError::Token(msg) => {
                AppError::InternalServerError(msg)
            }
            UserError::Listing(ListingError::DataAccess(msg)) => AppError::DataAccess(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
