//! Storage-agnostic filter predicates.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::query::SortOrder;

/// How a searchable field is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Case-insensitive substring match
    Text,
    /// Exact integer match
    Number,
    /// Exact string match (ids, enum values)
    Keyword,
    /// Whole-day range match
    Date,
    /// Stored but never searchable or sortable, such as credential hashes
    Hidden,
}

impl FieldKind {
    pub fn is_hidden(self) -> bool {
        self == FieldKind::Hidden
    }
}

/// Field descriptors for one entity type. Fields not listed are `Text`.
#[derive(Debug, Clone, Copy)]
pub struct FieldSet {
    fields: &'static [(&'static str, FieldKind)],
}

impl FieldSet {
    pub const fn new(fields: &'static [(&'static str, FieldKind)]) -> Self {
        Self { fields }
    }

    pub fn kind(&self, name: &str) -> FieldKind {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, kind)| *kind)
            .unwrap_or(FieldKind::Text)
    }

    /// Whether `name` may be searched or sorted on. Hidden fields and
    /// names shaped like query operators (`$where`, `$or`) are refused.
    pub fn is_addressable(&self, name: &str) -> bool {
        !is_operator(name) && !self.kind(name).is_hidden()
    }

    /// Drop an ordering on a field that is not addressable.
    pub fn allow_order(&self, order: Option<SortOrder>) -> Option<SortOrder> {
        order.filter(|order| self.is_addressable(&order.field))
    }
}

/// Storage query languages treat a leading `$` as an operator.
pub fn is_operator(name: &str) -> bool {
    name.starts_with('$')
}

/// A field value exposed by a record for filtering and ordering.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Ordering between values of the same variant. Mixed variants are
    /// ordered by variant so sorting stays total.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Integer(_) => 0,
            FieldValue::Text(_) => 1,
            FieldValue::Timestamp(_) => 2,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equals { field: String, value: FieldValue },
    /// Case-insensitive literal substring
    Contains { field: String, needle: String },
    /// Inclusive on both ends
    Between {
        field: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Condition {
    pub fn equals(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Condition::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Condition::Equals { field, .. }
            | Condition::Contains { field, .. }
            | Condition::Between { field, .. } => field,
        }
    }

    pub fn matches(&self, actual: Option<&FieldValue>) -> bool {
        match (self, actual) {
            (Condition::Equals { value, .. }, Some(actual)) => value == actual,
            (Condition::Contains { needle, .. }, Some(FieldValue::Text(text))) => {
                text.to_lowercase().contains(&needle.to_lowercase())
            }
            (Condition::Between { start, end, .. }, Some(FieldValue::Timestamp(at))) => {
                start <= at && at <= end
            }
            _ => false,
        }
    }
}

/// Conjunction of conditions. An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn merge(mut self, other: Filter) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate against a record through a field lookup.
    pub fn matches<F>(&self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<FieldValue>,
    {
        self.conditions
            .iter()
            .all(|condition| condition.matches(lookup(condition.field()).as_ref()))
    }
}

impl From<Condition> for Filter {
    fn from(condition: Condition) -> Self {
        Filter::all().and(condition)
    }
}
