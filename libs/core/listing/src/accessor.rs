use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ListingResult;
use crate::filter::{FieldValue, Filter};
use crate::pager::Window;
use crate::query::SortOrder;

/// A stored entity that can be filtered and ordered by field name.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;

    /// Value of a named field, `None` when the entity has no such field.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Narrow storage interface used by listing and the entity services.
///
/// Implementations translate [`Filter`] and [`SortOrder`] into whatever the
/// backing store understands. Failures surface as
/// [`ListingError::DataAccess`](crate::ListingError::DataAccess); no retry
/// is attempted at this layer.
#[async_trait]
pub trait EntityAccessor<T: Send + Sync + 'static>: Send + Sync {
    /// Count records matching a filter
    async fn count(&self, filter: &Filter) -> ListingResult<u64>;

    /// Fetch the filtered, ordered and windowed slice
    async fn find(
        &self,
        filter: &Filter,
        order: Option<&SortOrder>,
        window: Window,
    ) -> ListingResult<Vec<T>>;

    async fn find_by_id(&self, id: Uuid) -> ListingResult<Option<T>>;

    async fn insert(&self, record: T) -> ListingResult<Uuid>;

    /// Replace a record. Returns `false` when no record has that id.
    async fn update_by_id(&self, id: Uuid, record: T) -> ListingResult<bool>;

    /// Returns `false` when no record has that id.
    async fn delete_by_id(&self, id: Uuid) -> ListingResult<bool>;
}

/// Accessor handle shared between services and request handlers.
pub type SharedAccessor<T> = Arc<dyn EntityAccessor<T>>;
