//! Search, type filter and sort for entity lists.

use crate::route::{RouteState, SortOrder, DEFAULT_SORT_BY, FILTER_ALL};
use crate::world::{FieldValue, Fields};
use std::borrow::Cow;
use std::cmp::Ordering;

/// The list parameters of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub filter_type: String,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl ListQuery {
    pub fn new(
        search: impl Into<String>,
        filter_type: impl Into<String>,
        sort_by: impl Into<String>,
        sort_order: SortOrder,
    ) -> Self {
        Self {
            search: search.into(),
            filter_type: filter_type.into(),
            sort_by: sort_by.into(),
            sort_order,
        }
    }

    /// Whether a record passes the search and type filter.
    pub fn matches<R: Fields + ?Sized>(&self, record: &R) -> bool {
        let needle = self.search.to_lowercase();
        let text_match = needle.is_empty()
            || record.name().to_lowercase().contains(&needle)
            || record.description().to_lowercase().contains(&needle);

        let type_match = self.filter_type == FILTER_ALL || record.kind_tag() == self.filter_type;

        text_match && type_match
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new("", FILTER_ALL, DEFAULT_SORT_BY, SortOrder::Asc)
    }
}

impl From<&RouteState> for ListQuery {
    fn from(route: &RouteState) -> Self {
        Self::new(
            route.search.clone(),
            route.filter_type.clone(),
            route.sort_by.clone(),
            route.sort_order,
        )
    }
}

/// Filter and sort records.
///
/// Sorting is stable. Numeric fields compare numerically, everything else
/// compares as lower-cased text, and missing values compare as `""`.
/// Descending order is the exact reverse of ascending order, ties included.
pub fn filter_and_sort<'a, R, I>(records: I, query: &ListQuery) -> Vec<&'a R>
where
    R: Fields + ?Sized + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut matched: Vec<&'a R> = records.into_iter().filter(|r| query.matches(*r)).collect();

    matched.sort_by(|a, b| compare_field(*a, *b, &query.sort_by));

    if query.sort_order == SortOrder::Desc {
        matched.reverse();
    }
    matched
}

fn compare_field<R: Fields + ?Sized>(a: &R, b: &R, key: &str) -> Ordering {
    let left = a.field(key).unwrap_or(FieldValue::Empty);
    let right = b.field(key).unwrap_or(FieldValue::Empty);

    match (left, right) {
        (FieldValue::Number(x), FieldValue::Number(y)) => x.cmp(&y),
        (left, right) => sort_text(&left).cmp(&sort_text(&right)),
    }
}

fn sort_text<'a>(value: &FieldValue<'a>) -> Cow<'a, str> {
    match value {
        FieldValue::Text(s) => Cow::Owned(s.to_lowercase()),
        other => other.as_text(),
    }
}
