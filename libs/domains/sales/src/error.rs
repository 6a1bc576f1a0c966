use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use listing::ListingError;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum SaleError {
    #[error("Sale {0} not found")]
    NotFound(Uuid),

    /// A well-formed request the current data cannot satisfy
    #[error("{0}")]
    Unprocessable(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Listing(#[from] ListingError),
}

pub type SaleResult<T> = Result<T, SaleError>;

impl From<SaleError> for AppError {
    fn from(err: SaleError) -> Self {
        match err {
            SaleError::NotFound(id) => AppError::NotFound(format!("Sale {} not found", id)),
            SaleError::Unprocessable(msg) => AppError::UnprocessableEntity(msg),
            SaleError::Validation(errors) => AppError::ValidationError(errors),
            SaleError::Listing(ListingError::DataAccess(msg)) => AppError::DataAccess(msg),
        }
    }
}

impl IntoResponse for SaleError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
