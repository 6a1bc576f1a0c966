//! MongoDB wiring for the `users` collection

use listing::{ListingResult, MongoAccessor, SharedAccessor};
use mongodb::{Database, IndexModel, bson::doc, options::IndexOptions};
use std::sync::Arc;

use crate::models::User;

pub const COLLECTION: &str = "users";

fn indexes() -> Vec<IndexModel> {
    vec![
        // Emails are stored lowercased, so a plain unique index is enough
        IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_email_unique".to_string())
                    .build(),
            )
            .build(),
    ]
}

/// Accessor over `users` with its indexes in place.
pub async fn user_accessor(db: &Database) -> ListingResult<SharedAccessor<User>> {
    let accessor = MongoAccessor::<User>::new(db, COLLECTION);
    accessor.init_indexes(indexes()).await?;
    Ok(Arc::new(accessor))
}
