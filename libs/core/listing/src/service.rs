//! Paginated listing shared by every entity type.
//!
//! The record count and the page slice are two independent reads. If
//! records are written between them, `count` and `data` can disagree for
//! that one response; nothing here tries to reconcile them.

use chrono::Local;
use tracing::instrument;
use uuid::Uuid;

use crate::accessor::{EntityAccessor, Record};
use crate::builder::QueryBuilder;
use crate::error::ListingResult;
use crate::filter::{FieldSet, Filter};
use crate::pager::{Page, Window, compute_meta, compute_window};
use crate::query::ListQuery;

/// List one page of `T`, projected to `P`.
pub async fn list<T, P, A>(accessor: &A, fields: &FieldSet, query: &ListQuery) -> ListingResult<Page<P>>
where
    T: Record,
    P: From<T>,
    A: EntityAccessor<T> + ?Sized,
{
    list_scoped(accessor, fields, query, Filter::all()).await
}

/// Like [`list`], with `scope` ANDed onto whatever the search produces.
/// The search can narrow the scope but never replace it.
#[instrument(skip(accessor, fields, scope))]
pub async fn list_scoped<T, P, A>(
    accessor: &A,
    fields: &FieldSet,
    query: &ListQuery,
    scope: Filter,
) -> ListingResult<Page<P>>
where
    T: Record,
    P: From<T>,
    A: EntityAccessor<T> + ?Sized,
{
    let query = query.normalize();
    let search = query
        .search
        .as_ref()
        .map(|term| QueryBuilder::filter_for(term, fields, &Local))
        .unwrap_or_default();
    let filter = scope.merge(search);

    let total_count = accessor.count(&filter).await?;
    let window = compute_window(query.page_number, query.page_size);
    let order = fields.allow_order(query.sort);
    let records = accessor.find(&filter, order.as_ref(), window).await?;

    let meta = compute_meta(total_count, query.page_number, query.page_size);
    tracing::debug!(
        count = meta.count,
        page = meta.page_number,
        returned = records.len(),
        "Listing page assembled"
    );

    Ok(Page::new(meta, records.into_iter().map(P::from).collect()))
}

/// Whether a record other than `except` matches `filter`. Backs the
/// uniqueness checks on names and emails.
pub async fn exists_other<T, A>(accessor: &A, filter: &Filter, except: Option<Uuid>) -> ListingResult<bool>
where
    T: Record,
    A: EntityAccessor<T> + ?Sized,
{
    // With at most one clash allowed by the unique index, two rows are
    // enough to see past `except`.
    let window = Window {
        limit: 2,
        offset: 0,
    };
    let found = accessor.find(filter, None, window).await?;
    Ok(found.iter().any(|record| Some(record.id()) != except))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListingError;
    use crate::filter::FieldValue;
    use crate::pager::Window;
    use crate::query::SortOrder;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Debug, Clone)]
    struct Item {
        id: Uuid,
    }

    impl Record for Item {
        fn id(&self) -> Uuid {
            self.id
        }

        fn field(&self, _name: &str) -> Option<FieldValue> {
            None
        }
    }

    #[derive(Debug)]
    struct ItemView {
        id: Uuid,
    }

    impl From<Item> for ItemView {
        fn from(item: Item) -> Self {
            Self { id: item.id }
        }
    }

    /// Reports a fixed count and records the window it was asked for.
    struct StubAccessor {
        count: ListingResult<u64>,
        items: Vec<Item>,
        seen: Mutex<Vec<(Filter, Window)>>,
    }

    impl StubAccessor {
        fn new(count: ListingResult<u64>, items: Vec<Item>) -> Self {
            Self {
                count,
                items,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EntityAccessor<Item> for StubAccessor {
        async fn count(&self, _filter: &Filter) -> ListingResult<u64> {
            match &self.count {
                Ok(count) => Ok(*count),
                Err(ListingError::DataAccess(msg)) => Err(ListingError::DataAccess(msg.clone())),
            }
        }

        async fn find(
            &self,
            filter: &Filter,
            _order: Option<&SortOrder>,
            window: Window,
        ) -> ListingResult<Vec<Item>> {
            self.seen.lock().unwrap().push((filter.clone(), window));
            Ok(self.items.clone())
        }

        async fn find_by_id(&self, _id: Uuid) -> ListingResult<Option<Item>> {
            Ok(None)
        }

        async fn insert(&self, record: Item) -> ListingResult<Uuid> {
            Ok(record.id)
        }

        async fn update_by_id(&self, _id: Uuid, _record: Item) -> ListingResult<bool> {
            Ok(false)
        }

        async fn delete_by_id(&self, _id: Uuid) -> ListingResult<bool> {
            Ok(false)
        }
    }

    const FIELDS: FieldSet = FieldSet::new(&[]);

    #[tokio::test]
    async fn test_count_failure_propagates_as_data_access() {
        let accessor = StubAccessor::new(Err(ListingError::DataAccess("connection refused".into())), vec![]);

        let result = list::<Item, ItemView, _>(&accessor, &FIELDS, &ListQuery::default()).await;
        assert!(matches!(result, Err(ListingError::DataAccess(_))));
        assert!(accessor.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_window_passed_to_accessor() {
        let id = Uuid::now_v7();
        let accessor = StubAccessor::new(Ok(42), vec![Item { id }]);

        let query = ListQuery {
            page_number: Some("3".into()),
            ..Default::default()
        };
        let page = list::<Item, ItemView, _>(&accessor, &FIELDS, &query)
            .await
            .unwrap();
        assert_eq!(page.count, 42);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.data[0].id, id);

        let seen = accessor.seen.lock().unwrap();
        assert_eq!(seen[0].1, Window { limit: 10, offset: 20 });
    }

    #[tokio::test]
    async fn test_scope_is_kept_alongside_search() {
        use crate::filter::Condition;

        let accessor = StubAccessor::new(Ok(0), vec![]);
        let scope = Filter::from(Condition::equals("user_id", "u-1"));
        let query = ListQuery {
            search: Some("user_id:u-2".into()),
            ..Default::default()
        };

        list_scoped::<Item, ItemView, _>(&accessor, &FIELDS, &query, scope)
            .await
            .unwrap();

        let seen = accessor.seen.lock().unwrap();
        let conditions = seen[0].0.conditions();
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0], Condition::equals("user_id", "u-1"));
    }

    #[tokio::test]
    async fn test_oversized_page_size_is_capped_for_accessor() {
        let accessor = StubAccessor::new(Ok(3), vec![]);
        let query = ListQuery {
            page_size: Some(u64::MAX.to_string()),
            ..Default::default()
        };

        let page = list::<Item, ItemView, _>(&accessor, &FIELDS, &query)
            .await
            .unwrap();
        assert_eq!(page.total_pages, 1);

        let seen = accessor.seen.lock().unwrap();
        assert_eq!(seen[0].1, Window { limit: crate::pager::MAX_WINDOW, offset: 0 });
    }

    #[tokio::test]
    async fn test_operator_search_is_dropped() {
        let accessor = StubAccessor::new(Ok(0), vec![]);
        let query = ListQuery {
            search: Some("$where:abc".into()),
            sort: Some("$natural:desc".into()),
            ..Default::default()
        };

        list::<Item, ItemView, _>(&accessor, &FIELDS, &query)
            .await
            .unwrap();

        let seen = accessor.seen.lock().unwrap();
        assert!(seen[0].0.is_empty());
    }
}
