//! Route-state mapping between URLs and the world-builder's logical location.
//!
//! Paths are nested (`/world-builder/<section>/<subsection>`) and map
//! one-to-one onto `(Section, Option<Collection>)`. List parameters (view
//! mode, search, filter, sort) live in the query string and are carried
//! independently of the path.
//!
//! The path table is declared once in [`ROUTES`]; the forward and reverse
//! lookups are derived from it on first use, and the derivation refuses a
//! table that is not a bijection.
//!
//! Decoding never fails. Paths that are not in the table are read with the
//! legacy flat scheme (`?tab=<section>&subTab=<subsection>`), and anything
//! unknown falls back to the overview.

use crate::query::{ParamKey, QueryString};
use crate::world::Collection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Root of every world-builder path.
pub const BASE_PATH: &str = "/world-builder";

/// `filterType` value that disables type filtering.
pub const FILTER_ALL: &str = "all";

/// Default `sortBy` field.
pub const DEFAULT_SORT_BY: &str = "name";

/// Legacy flat query keys.
const LEGACY_TAB: &str = "tab";
const LEGACY_SUB_TAB: &str = "subTab";

/// Top-level world-builder sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    #[default]
    Overview,
    Geography,
    Cultures,
    Systems,
    History,
}

impl Section {
    pub const ALL: &'static [Section] = &[
        Section::Overview,
        Section::Geography,
        Section::Cultures,
        Section::Systems,
        Section::History,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Section::Overview => "overview",
            Section::Geography => "geography",
            Section::Cultures => "cultures",
            Section::Systems => "systems",
            Section::History => "history",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Section::ALL.iter().copied().find(|s| s.key() == key)
    }

    /// Collections listed under this section, in table order.
    pub fn subsections(&self) -> Vec<Collection> {
        Collection::ALL
            .iter()
            .copied()
            .filter(|c| c.section() == *self)
            .collect()
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How the active collection is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "grid" => Some(ViewMode::Grid),
            "list" => Some(ViewMode::List),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Where the user is and how the list is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteState {
    pub section: Section,
    pub subsection: Option<Collection>,
    pub view_mode: ViewMode,
    pub search: String,
    pub filter_type: String,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl RouteState {
    /// A route with every list parameter at its default.
    pub fn new(section: Section, subsection: Option<Collection>) -> Self {
        Self {
            section,
            subsection,
            view_mode: ViewMode::default(),
            search: String::new(),
            filter_type: FILTER_ALL.to_string(),
            sort_by: DEFAULT_SORT_BY.to_string(),
            sort_order: SortOrder::default(),
        }
    }

    /// The canonical path for this route's section and subsection.
    pub fn path(&self) -> &'static str {
        route_path(self.section, self.subsection)
    }

    /// Whether this route points at the given section and subsection.
    pub fn is_at(&self, section: Section, subsection: Option<Collection>) -> bool {
        self.section == section && self.subsection == subsection
    }

    /// Overlay list parameters from a query string, defaulting anything
    /// missing or unparseable.
    fn with_query(mut self, query: &QueryString) -> Self {
        self.view_mode = query
            .get_non_empty(ParamKey::ViewMode.as_str())
            .and_then(ViewMode::from_param)
            .unwrap_or_default();
        self.search = query
            .get(ParamKey::Search.as_str())
            .unwrap_or_default()
            .to_string();
        self.filter_type = query
            .get_non_empty(ParamKey::FilterType.as_str())
            .unwrap_or(FILTER_ALL)
            .to_string();
        self.sort_by = query
            .get_non_empty(ParamKey::SortBy.as_str())
            .unwrap_or(DEFAULT_SORT_BY)
            .to_string();
        self.sort_order = query
            .get_non_empty(ParamKey::SortOrder.as_str())
            .and_then(SortOrder::from_param)
            .unwrap_or_default();
        self
    }
}

impl Default for RouteState {
    fn default() -> Self {
        Self::new(Section::Overview, None)
    }
}

// ============================================================================
// Path table
// ============================================================================

/// One row of the canonical path table.
#[derive(Debug, Clone, Copy)]
pub struct RouteEntry {
    pub section: Section,
    pub subsection: Option<Collection>,
    pub path: &'static str,
}

const fn entry(section: Section, subsection: Option<Collection>, path: &'static str) -> RouteEntry {
    RouteEntry {
        section,
        subsection,
        path,
    }
}

/// The canonical path table.
pub const ROUTES: &[RouteEntry] = &[
    entry(Section::Overview, None, "/world-builder"),
    entry(Section::Geography, None, "/world-builder/geography"),
    entry(Section::Geography, Some(Collection::Locations), "/world-builder/geography/locations"),
    entry(Section::Geography, Some(Collection::Regions), "/world-builder/geography/regions"),
    entry(Section::Geography, Some(Collection::Landmarks), "/world-builder/geography/landmarks"),
    entry(Section::Geography, Some(Collection::Resources), "/world-builder/geography/resources"),
    entry(Section::Cultures, None, "/world-builder/cultures"),
    entry(Section::Cultures, Some(Collection::Peoples), "/world-builder/cultures/peoples"),
    entry(Section::Cultures, Some(Collection::Religions), "/world-builder/cultures/religions"),
    entry(Section::Cultures, Some(Collection::Languages), "/world-builder/cultures/languages"),
    entry(Section::Cultures, Some(Collection::Traditions), "/world-builder/cultures/traditions"),
    entry(Section::Systems, None, "/world-builder/systems"),
    entry(Section::Systems, Some(Collection::MagicSystems), "/world-builder/systems/magic"),
    entry(Section::Systems, Some(Collection::Technologies), "/world-builder/systems/technology"),
    entry(Section::Systems, Some(Collection::Governments), "/world-builder/systems/government"),
    entry(Section::Systems, Some(Collection::Economies), "/world-builder/systems/economy"),
    entry(Section::History, None, "/world-builder/history"),
    entry(Section::History, Some(Collection::Events), "/world-builder/history/events"),
];

type RouteKey = (Section, Option<Collection>);

/// Forward and reverse views of [`ROUTES`].
struct RouteIndex {
    by_path: HashMap<&'static str, RouteKey>,
    by_route: HashMap<RouteKey, &'static str>,
}

impl RouteIndex {
    fn build(table: &[RouteEntry]) -> Self {
        let mut by_path = HashMap::with_capacity(table.len());
        let mut by_route = HashMap::with_capacity(table.len());

        for row in table {
            let key = (row.section, row.subsection);
            if let Some(sub) = row.subsection {
                assert_eq!(
                    sub.section(),
                    row.section,
                    "route table lists {sub} under {}",
                    row.section
                );
            }
            assert!(
                by_path.insert(row.path, key).is_none(),
                "route table repeats path {}",
                row.path
            );
            assert!(
                by_route.insert(key, row.path).is_none(),
                "route table repeats route {key:?}"
            );
        }

        Self { by_path, by_route }
    }
}

lazy_static::lazy_static! {
    static ref ROUTE_INDEX: RouteIndex = RouteIndex::build(ROUTES);
}

/// Canonical path for a typed route. Subsections listed under a different
/// section resolve to the section's bare path.
pub fn route_path(section: Section, subsection: Option<Collection>) -> &'static str {
    let index = &*ROUTE_INDEX;
    index
        .by_route
        .get(&(section, subsection))
        .or_else(|| index.by_route.get(&(section, None)))
        .copied()
        .unwrap_or(BASE_PATH)
}

/// Look a path up in the table. A single trailing `/` is ignored.
pub fn lookup_path(pathname: &str) -> Option<(Section, Option<Collection>)> {
    let trimmed = if pathname.len() > 1 {
        pathname.strip_suffix('/').unwrap_or(pathname)
    } else {
        pathname
    };
    ROUTE_INDEX.by_path.get(trimmed).copied()
}

// ============================================================================
// Decode / encode
// ============================================================================

/// Decode a location into a route. Never fails.
pub fn decode(pathname: &str, search: &str) -> RouteState {
    let query = QueryString::parse(search);

    let (section, subsection) = match lookup_path(pathname) {
        Some(key) => key,
        None => decode_legacy(pathname, &query),
    };

    RouteState::new(section, subsection).with_query(&query)
}

/// Read the flat `tab`/`subTab` scheme used before nested paths existed.
fn decode_legacy(pathname: &str, query: &QueryString) -> RouteKey {
    let tab = query.get_non_empty(LEGACY_TAB).unwrap_or("overview");
    let section = match Section::from_key(tab) {
        Some(section) => section,
        None => {
            tracing::debug!(pathname, tab, "unknown section in legacy route, using overview");
            Section::Overview
        }
    };

    let subsection = query.get_non_empty(LEGACY_SUB_TAB).and_then(|sub| {
        let resolved = Collection::from_key(sub).filter(|c| c.section() == section);
        if resolved.is_none() {
            tracing::debug!(pathname, sub, %section, "dropping unknown legacy subsection");
        }
        resolved
    });

    tracing::debug!(pathname, %section, ?subsection, "resolved unmapped path through legacy query");
    (section, subsection)
}

/// Encode a section/subsection pair given as keys. Never fails.
///
/// An empty or unknown subsection of a known section yields the section's
/// bare path. An unknown section yields a legacy flat URL so the value is
/// not lost.
pub fn encode_path(section: &str, subsection: &str) -> String {
    match Section::from_key(section) {
        Some(known) => {
            let sub = Collection::from_key(subsection).filter(|c| c.section() == known);
            route_path(known, sub).to_string()
        }
        None => {
            tracing::debug!(section, subsection, "encoding unknown section as legacy query");
            let mut query = QueryString::new();
            query.set(LEGACY_TAB, section);
            if !subsection.is_empty() {
                query.set(LEGACY_SUB_TAB, subsection);
            }
            format!("{BASE_PATH}{}", query.to_search())
        }
    }
}
