//! Sales Domain
//!
//! Orders placed against the catalogue: each sale references a product and
//! a user, takes its quantity out of stock when placed and then moves
//! through `Placed → Packed → Shipped → Delivered`.
//!
//! ```rust,ignore
//! use domain_sales::{SaleService, handlers, mongodb};
//!
//! let service = SaleService::new(
//!     mongodb::sale_accessor(&db).await?,
//!     products.accessor(),
//!     users.accessor(),
//! );
//! let router = handlers::router(service);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod service;

pub use error::{SaleError, SaleResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateSale, DeliveryStatus, SALE_FIELDS, Sale, SaleResponse, UpdateDeliveryStatus, UpdateSale,
};
pub use service::SaleService;
