//! MongoDB wiring for the `products` collection

use listing::{ListingResult, MongoAccessor, SharedAccessor};
use mongodb::{Database, IndexModel, bson::doc, options::IndexOptions};
use std::sync::Arc;

use crate::models::Product;

pub const COLLECTION: &str = "products";

fn indexes() -> Vec<IndexModel> {
    vec![
        // Product names are unique across the catalogue
        IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_name_unique".to_string())
                    .build(),
            )
            .build(),
        IndexModel::builder()
            .keys(doc! { "category": 1, "price": 1 })
            .options(
                IndexOptions::builder()
                    .name("idx_category_price".to_string())
                    .build(),
            )
            .build(),
    ]
}

/// Accessor over `products` with its indexes in place.
pub async fn product_accessor(db: &Database) -> ListingResult<SharedAccessor<Product>> {
    let accessor = MongoAccessor::<Product>::new(db, COLLECTION);
    accessor.init_indexes(indexes()).await?;
    Ok(Arc::new(accessor))
}
