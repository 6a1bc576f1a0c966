use thiserror::Error;

/// Failure raised by an entity accessor.
///
/// Listing never fails on malformed sort, search or paging input, so the
/// only error it can surface is the store itself failing.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Data access error: {0}")]
    DataAccess(String),
}

pub type ListingResult<T> = Result<T, ListingError>;

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for ListingError {
    fn from(err: mongodb::error::Error) -> Self {
        ListingError::DataAccess(err.to_string())
    }
}
