//! MongoDB wiring for the `sales` collection

use listing::{ListingResult, MongoAccessor, SharedAccessor};
use mongodb::{Database, IndexModel, bson::doc, options::IndexOptions};
use std::sync::Arc;

use crate::models::Sale;

pub const COLLECTION: &str = "sales";

fn indexes() -> Vec<IndexModel> {
    vec![
        // Per-user history, newest first
        IndexModel::builder()
            .keys(doc! { "user_id": 1, "date": -1 })
            .options(
                IndexOptions::builder()
                    .name("idx_user_date".to_string())
                    .build(),
            )
            .build(),
        IndexModel::builder()
            .keys(doc! { "date": -1 })
            .options(IndexOptions::builder().name("idx_date".to_string()).build())
            .build(),
    ]
}

/// Accessor over `sales` with its indexes in place.
pub async fn sale_accessor(db: &Database) -> ListingResult<SharedAccessor<Sale>> {
    let accessor = MongoAccessor::<Sale>::new(db, COLLECTION);
    accessor.init_indexes(indexes()).await?;
    Ok(Arc::new(accessor))
}
