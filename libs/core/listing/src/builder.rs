//! Translates `sort` and `search` specs into an ordering and a filter.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crate::filter::{Condition, FieldKind, FieldSet, Filter};
use crate::query::{SearchTerm, SortOrder, parse_search, parse_sort};

/// Pure translation of listing specs. Malformed input degrades to no
/// ordering or no filter; it never fails.
pub struct QueryBuilder;

impl QueryBuilder {
    /// Build using the server's local time zone for date fields.
    pub fn build(
        sort: Option<&str>,
        search: Option<&str>,
        fields: &FieldSet,
    ) -> (Option<SortOrder>, Filter) {
        Self::build_in_zone(sort, search, fields, &Local)
    }

    pub fn build_in_zone<Tz: TimeZone>(
        sort: Option<&str>,
        search: Option<&str>,
        fields: &FieldSet,
        zone: &Tz,
    ) -> (Option<SortOrder>, Filter) {
        let order = fields.allow_order(sort.and_then(parse_sort));
        let filter = search
            .and_then(parse_search)
            .map(|term| Self::filter_for(&term, fields, zone))
            .unwrap_or_default();

        (order, filter)
    }

    pub fn filter_for<Tz: TimeZone>(term: &SearchTerm, fields: &FieldSet, zone: &Tz) -> Filter {
        condition_for(term, fields, zone)
            .map(Filter::from)
            .unwrap_or_default()
    }
}

fn condition_for<Tz: TimeZone>(
    term: &SearchTerm,
    fields: &FieldSet,
    zone: &Tz,
) -> Option<Condition> {
    if !fields.is_addressable(&term.field) {
        return None;
    }
    let field = term.field.clone();

    match fields.kind(&term.field) {
        FieldKind::Number => term
            .value
            .trim()
            .parse::<i64>()
            .ok()
            .map(|number| Condition::equals(field, number)),
        FieldKind::Keyword => Some(Condition::equals(field, term.value.clone())),
        FieldKind::Date => {
            day_bounds(&term.value, zone).map(|(start, end)| Condition::Between { field, start, end })
        }
        FieldKind::Text => Some(Condition::Contains {
            field,
            needle: term.value.clone(),
        }),
        FieldKind::Hidden => None,
    }
}

/// First and last millisecond of the day named by `value` in `zone`.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; the latter selects the
/// day it falls on in `zone`.
pub fn day_bounds<Tz: TimeZone>(value: &str, zone: &Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let value = value.trim();
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|at| at.with_timezone(zone).date_naive())
    })?;

    let start = zone
        .from_local_datetime(&day.and_hms_opt(0, 0, 0)?)
        .earliest()?;
    let end = zone
        .from_local_datetime(&day.and_hms_milli_opt(23, 59, 59, 999)?)
        .latest()?;

    Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}
