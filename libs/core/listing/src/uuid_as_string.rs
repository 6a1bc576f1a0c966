//! Serde adapter that always writes a UUID as its hyphenated string.
//!
//! The BSON serializer is not human-readable, so a bare `Uuid` would be
//! stored as binary and stop matching the string keys used in filters.
//!
//! ```rust,ignore
//! #[serde(rename = "_id", alias = "id", with = "listing::uuid_as_string")]
//! pub id: Uuid,
//! ```

use serde::{Deserialize, Deserializer, Serializer};
use uuid::Uuid;

pub fn serialize<S: Serializer>(id: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&id.hyphenated().to_string())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Uuid::parse_str(&raw).map_err(serde::de::Error::custom)
}
