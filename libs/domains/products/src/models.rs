use chrono::{DateTime, Utc};
use listing::{FieldKind, FieldSet, FieldValue, Record};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Searchable fields that are not plain text.
pub const PRODUCT_FIELDS: FieldSet = FieldSet::new(&[
    ("price", FieldKind::Number),
    ("stock", FieldKind::Number),
    ("created_at", FieldKind::Date),
    ("updated_at", FieldKind::Date),
]);

/// Product entity as stored in the `products` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", alias = "id", with = "listing::uuid_as_string")]
    pub id: Uuid,
    pub name: String,
    /// Price in the smallest currency unit
    pub price: i64,
    pub description: String,
    pub category: String,
    pub stock: i64,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(input: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            price: input.price,
            description: input.description,
            category: input.category,
            stock: input.stock,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateProduct) {
        self.name = update.name;
        self.price = update.price;
        self.description = update.description;
        self.category = update.category;
        self.updated_at = Utc::now();
    }

    pub fn set_stock(&mut self, stock: i64) {
        self.stock = stock;
        self.updated_at = Utc::now();
    }
}

impl Record for Product {
    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.to_string().into()),
            "name" => Some(self.name.as_str().into()),
            "price" => Some(self.price.into()),
            "description" => Some(self.description.as_str().into()),
            "category" => Some(self.category.as_str().into()),
            "stock" => Some(self.stock.into()),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

/// Public view of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub description: String,
    pub category: String,
    pub stock: i64,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            description: product.description,
            category: product.category,
            stock: product.stock,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(range(min = 0))]
    pub stock: i64,
}

/// Full replacement of the descriptive fields. Stock has its own endpoint.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateStock {
    #[validate(range(min = 0))]
    pub stock: i64,
}
