//! MongoDB implementation of [`EntityAccessor`].

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use mongodb::{Collection, Database, IndexModel, options::FindOptions};
use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;
use uuid::Uuid;

use crate::accessor::{EntityAccessor, Record};
use crate::error::ListingResult;
use crate::filter::{Condition, FieldValue, Filter, is_operator};
use crate::pager::Window;
use crate::query::SortOrder;

/// Generic collection-backed accessor. Documents are keyed by their UUID in
/// string form under `_id`.
pub struct MongoAccessor<T: Send + Sync> {
    collection: Collection<T>,
}

impl<T> MongoAccessor<T>
where
    T: Record + Serialize + DeserializeOwned + Unpin,
{
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<T>(collection_name),
        }
    }

    pub async fn init_indexes(&self, indexes: Vec<IndexModel>) -> ListingResult<()> {
        if indexes.is_empty() {
            return Ok(());
        }
        self.collection.create_indexes(indexes).await?;
        tracing::info!(
            collection = self.collection.name(),
            "Indexes created successfully"
        );
        Ok(())
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }
}

impl<T: Send + Sync> Clone for MongoAccessor<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
        }
    }
}

fn id_filter(id: Uuid) -> Document {
    doc! { "_id": id.to_string() }
}

fn document_field(field: &str) -> &str {
    if field == "id" { "_id" } else { field }
}

fn to_bson_value(value: &FieldValue) -> Bson {
    match value {
        FieldValue::Text(text) => Bson::String(text.clone()),
        FieldValue::Integer(number) => Bson::Int64(*number),
        FieldValue::Timestamp(at) => Bson::DateTime(bson::DateTime::from_chrono(*at)),
    }
}

fn condition_document(condition: &Condition) -> Document {
    let predicate = match condition {
        Condition::Equals { value, .. } => to_bson_value(value),
        Condition::Contains { needle, .. } => Bson::Document(doc! {
            "$regex": regex::escape(needle),
            "$options": "i",
        }),
        Condition::Between { start, end, .. } => Bson::Document(doc! {
            "$gte": bson::DateTime::from_chrono(*start),
            "$lte": bson::DateTime::from_chrono(*end),
        }),
    };

    let mut document = Document::new();
    document.insert(document_field(condition.field()), predicate);
    document
}

/// Translate a filter into a query document. Several conditions are
/// combined with `$and` so two conditions on one field both apply.
/// Conditions on operator-shaped field names are skipped.
pub fn build_filter(filter: &Filter) -> Document {
    let mut clauses: Vec<Document> = filter
        .conditions()
        .iter()
        .filter(|condition| !is_operator(condition.field()))
        .map(condition_document)
        .collect();

    match clauses.len() {
        0 => doc! {},
        1 => clauses.remove(0),
        _ => doc! { "$and": clauses },
    }
}

/// `None` when the field name is operator-shaped.
pub fn build_sort(order: &SortOrder) -> Option<Document> {
    if is_operator(&order.field) {
        return None;
    }

    let direction = if order.is_descending() { -1 } else { 1 };
    let mut document = Document::new();
    document.insert(document_field(&order.field), direction);
    Some(document)
}

#[async_trait]
impl<T> EntityAccessor<T> for MongoAccessor<T>
where
    T: Record + Serialize + DeserializeOwned + Unpin,
{
    #[instrument(skip(self, filter), fields(collection = self.collection.name()))]
    async fn count(&self, filter: &Filter) -> ListingResult<u64> {
        let count = self.collection.count_documents(build_filter(filter)).await?;
        Ok(count)
    }

    #[instrument(skip(self, filter, order), fields(collection = self.collection.name()))]
    async fn find(
        &self,
        filter: &Filter,
        order: Option<&SortOrder>,
        window: Window,
    ) -> ListingResult<Vec<T>> {
        use futures_util::TryStreamExt;

        let limit = i64::try_from(window.limit).unwrap_or(i64::MAX);
        let mut options = FindOptions::builder()
            .limit(limit)
            .skip(window.offset)
            .build();
        options.sort = order.and_then(build_sort);

        let cursor = self
            .collection
            .find(build_filter(filter))
            .with_options(options)
            .await?;
        let records: Vec<T> = cursor.try_collect().await?;

        Ok(records)
    }

    #[instrument(skip(self), fields(collection = self.collection.name()))]
    async fn find_by_id(&self, id: Uuid) -> ListingResult<Option<T>> {
        let record = self.collection.find_one(id_filter(id)).await?;
        Ok(record)
    }

    #[instrument(skip(self, record), fields(collection = self.collection.name()))]
    async fn insert(&self, record: T) -> ListingResult<Uuid> {
        self.collection.insert_one(&record).await?;
        Ok(record.id())
    }

    #[instrument(skip(self, record), fields(collection = self.collection.name()))]
    async fn update_by_id(&self, id: Uuid, record: T) -> ListingResult<bool> {
        let result = self.collection.replace_one(id_filter(id), &record).await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self), fields(collection = self.collection.name()))]
    async fn delete_by_id(&self, id: Uuid) -> ListingResult<bool> {
        let result = self.collection.delete_one(id_filter(id)).await?;
        Ok(result.deleted_count > 0)
    }
}
