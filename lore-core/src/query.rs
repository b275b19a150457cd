//! Query-string handling for list parameters.
//!
//! Keeps parameter order stable (insertion order, existing keys updated in
//! place) so URLs produced from the same state are always identical.

use std::fmt;

/// Query parameters the list views understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    ViewMode,
    Search,
    FilterType,
    SortBy,
    SortOrder,
}

impl ParamKey {
    pub const ALL: &'static [ParamKey] = &[
        ParamKey::ViewMode,
        ParamKey::Search,
        ParamKey::FilterType,
        ParamKey::SortBy,
        ParamKey::SortOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKey::ViewMode => "viewMode",
            ParamKey::Search => "search",
            ParamKey::FilterType => "filterType",
            ParamKey::SortBy => "sortBy",
            ParamKey::SortOrder => "sortOrder",
        }
    }
}

/// An ordered set of parameter changes.
///
/// An empty value means "remove this parameter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    entries: Vec<(ParamKey, String)>,
}

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing an earlier value for the same key.
    pub fn with(mut self, key: ParamKey, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn view_mode(self, mode: crate::route::ViewMode) -> Self {
        self.with(ParamKey::ViewMode, mode.as_str())
    }

    pub fn search(self, term: impl Into<String>) -> Self {
        self.with(ParamKey::Search, term)
    }

    pub fn filter_type(self, filter: impl Into<String>) -> Self {
        self.with(ParamKey::FilterType, filter)
    }

    pub fn sort_by(self, field: impl Into<String>) -> Self {
        self.with(ParamKey::SortBy, field)
    }

    pub fn sort_order(self, order: crate::route::SortOrder) -> Self {
        self.with(ParamKey::SortOrder, order.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParamKey, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `?a=1&b=two` (leading `?` optional). Never fails: malformed
    /// escapes are kept verbatim and pairs without `=` get an empty value.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs = raw
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (key, value) = part.split_once('=').unwrap_or((part, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();
        Self { pairs }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First non-empty value for `key`.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Set `key`, keeping its position if present; drops duplicates.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.pairs[index].1 = value;
                let mut seen = false;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// Apply parameter changes: non-empty values are set, empty ones removed.
    pub fn merge(&mut self, params: &RouteParams) {
        for (key, value) in params.iter() {
            if value.is_empty() {
                self.remove(key.as_str());
            } else {
                self.set(key.as_str(), value);
            }
        }
    }

    /// Build a query from parameters, skipping empty values.
    pub fn from_params(params: &RouteParams) -> Self {
        let mut query = Self::new();
        query.merge(params);
        query
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `?a=1&b=2`, or `""` when empty.
    pub fn to_search(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("?{self}")
        }
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(
                f,
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )?;
        }
        Ok(())
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
