use chrono::{DateTime, Utc};
use domain_products::ProductResponse;
use domain_users::UserResponse;
use listing::{FieldKind, FieldSet, FieldValue, Record};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Searchable fields that are not plain text.
pub const SALE_FIELDS: FieldSet = FieldSet::new(&[
    ("date", FieldKind::Date),
    ("quantity", FieldKind::Number),
    ("product_id", FieldKind::Keyword),
    ("user_id", FieldKind::Keyword),
    ("delivery_status", FieldKind::Keyword),
]);

/// Fulfilment stage of a sale
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum DeliveryStatus {
    #[default]
    Placed,
    Packed,
    Shipped,
    Delivered,
}

/// Sale entity as stored in the `sales` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    #[serde(rename = "_id", alias = "id", with = "listing::uuid_as_string")]
    pub id: Uuid,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
    #[serde(with = "listing::uuid_as_string")]
    pub product_id: Uuid,
    #[serde(with = "listing::uuid_as_string")]
    pub user_id: Uuid,
    pub quantity: i64,
    pub address: String,
    pub delivery_status: DeliveryStatus,
}

impl Sale {
    /// A freshly placed order dated now
    pub fn place(input: CreateSale) -> Self {
        Self {
            id: Uuid::now_v7(),
            date: Utc::now(),
            product_id: input.product_id,
            user_id: input.user_id,
            quantity: input.quantity,
            address: input.address,
            delivery_status: DeliveryStatus::Placed,
        }
    }

    pub fn apply_update(&mut self, update: UpdateSale) {
        self.product_id = update.product_id;
        self.user_id = update.user_id;
        self.quantity = update.quantity;
        self.address = update.address;
    }
}

impl Record for Sale {
    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.to_string().into()),
            "date" => Some(self.date.into()),
            "product_id" => Some(self.product_id.to_string().into()),
            "user_id" => Some(self.user_id.to_string().into()),
            "quantity" => Some(self.quantity.into()),
            "address" => Some(self.address.as_str().into()),
            "delivery_status" => Some(self.delivery_status.to_string().into()),
            _ => None,
        }
    }
}

/// Sale with its product and buyer resolved. A reference whose record
/// has since been deleted resolves to `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SaleResponse {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i64,
    pub address: String,
    pub delivery_status: DeliveryStatus,
    pub product: Option<ProductResponse>,
    pub user: Option<UserResponse>,
}

impl SaleResponse {
    pub fn new(sale: Sale, product: Option<ProductResponse>, user: Option<UserResponse>) -> Self {
        Self {
            id: sale.id,
            date: sale.date,
            product_id: sale.product_id,
            user_id: sale.user_id,
            quantity: sale.quantity,
            address: sale.address,
            delivery_status: sale.delivery_status,
            product,
            user,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSale {
    pub product_id: Uuid,
    pub user_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(length(min = 1, max = 100))]
    pub address: String,
}

/// Same shape as [`CreateSale`]. Stock is not adjusted on update.
pub type UpdateSale = CreateSale;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateDeliveryStatus {
    /// One of `Placed`, `Packed`, `Shipped`, `Delivered`
    #[validate(length(min = 1, max = 100))]
    pub delivery_status: String,
}
