//! In-memory entity accessor.
//!
//! Records keep insertion order, which stands in for a document store's
//! natural order when no sort is requested.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::accessor::{EntityAccessor, Record};
use crate::error::ListingResult;
use crate::filter::Filter;
use crate::pager::Window;
use crate::query::SortOrder;

pub struct InMemoryAccessor<T: Record> {
    records: Arc<RwLock<Vec<T>>>,
}

impl<T: Record> InMemoryAccessor<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }
}

impl<T: Record> Default for InMemoryAccessor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Clone for InMemoryAccessor<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

fn compare<T: Record>(a: &T, b: &T, order: &SortOrder) -> Ordering {
    // Missing fields sort first, as in a document store
    let ordering = match (a.field(&order.field), b.field(&order.field)) {
        (Some(a), Some(b)) => a.compare(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    if order.is_descending() {
        ordering.reverse()
    } else {
        ordering
    }
}

#[async_trait]
impl<T: Record> EntityAccessor<T> for InMemoryAccessor<T> {
    async fn count(&self, filter: &Filter) -> ListingResult<u64> {
        let records = self.records.read().await;
        let count = records
            .iter()
            .filter(|record| filter.matches(|field| record.field(field)))
            .count();
        Ok(count as u64)
    }

    async fn find(
        &self,
        filter: &Filter,
        order: Option<&SortOrder>,
        window: Window,
    ) -> ListingResult<Vec<T>> {
        let records = self.records.read().await;
        let mut matching: Vec<T> = records
            .iter()
            .filter(|record| filter.matches(|field| record.field(field)))
            .cloned()
            .collect();

        if let Some(order) = order {
            // Stable sort keeps insertion order between equal keys
            matching.sort_by(|a, b| compare(a, b, order));
        }

        let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);
        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> ListingResult<Option<T>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id() == id).cloned())
    }

    async fn insert(&self, record: T) -> ListingResult<Uuid> {
        let id = record.id();
        self.records.write().await.push(record);
        Ok(id)
    }

    async fn update_by_id(&self, id: Uuid, record: T) -> ListingResult<bool> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|existing| existing.id() == id) {
            Some(existing) => {
                *existing = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> ListingResult<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|record| record.id() != id);
        Ok(records.len() < before)
    }
}
