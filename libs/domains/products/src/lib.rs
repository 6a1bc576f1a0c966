//! Products Domain
//!
//! Catalogue management for the back office: paginated listing, CRUD,
//! stock updates and the startup seed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints under /api/products
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Name uniqueness, not-found mapping
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Accessor   │  ← listing::EntityAccessor (MongoDB or in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Product entity, response projection, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_products::{ProductService, handlers, mongodb};
//!
//! let accessor = mongodb::product_accessor(&db).await?;
//! let service = ProductService::new(accessor);
//! let router = handlers::router(service);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod seed;
pub mod service;

pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateProduct, PRODUCT_FIELDS, Product, ProductResponse, UpdateProduct, UpdateStock,
};
pub use seed::{SeedConfig, seed_default_products};
pub use service::ProductService;
