//! Generic paginated listing.
//!
//! ```text
//! ListQuery ──normalize──▶ Query ──QueryBuilder──▶ (SortOrder, Filter)
//!                                                     │
//!                             Pager ◀── count ── EntityAccessor ── find ──▶ records
//!                               │                                              │
//!                               └────────────────▶ Page<P> ◀── P::from ────────┘
//! ```
//!
//! Entity crates describe their searchable fields with a [`FieldSet`],
//! implement [`Record`] for their stored type and [`From`] for its public
//! projection, then call [`list`] or [`list_scoped`] against any
//! [`EntityAccessor`]. The in-memory accessor is always available; the
//! MongoDB accessor sits behind the `mongodb` feature.

pub mod accessor;
pub mod builder;
pub mod error;
pub mod filter;
pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongodb;
pub mod pager;
pub mod query;
pub mod service;
pub mod uuid_as_string;

pub use accessor::{EntityAccessor, Record, SharedAccessor};
pub use builder::QueryBuilder;
pub use error::{ListingError, ListingResult};
pub use filter::{Condition, FieldKind, FieldSet, FieldValue, Filter};
pub use memory::InMemoryAccessor;
#[cfg(feature = "mongodb")]
pub use crate::mongodb::MongoAccessor;
pub use pager::{MAX_WINDOW, Page, PageMeta, Window, compute_meta, compute_window};
pub use query::{Direction, ListQuery, Query, SearchTerm, SortOrder};
pub use service::{exists_other, list, list_scoped};
