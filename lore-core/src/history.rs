//! Browser-style history and the navigator that keeps it in step with the
//! decoded route.
//!
//! The [`Navigator`] owns a [`History`] and a cached [`RouteState`]; every
//! navigation writes the history entry and re-decodes it in the same call,
//! so the cached state always equals `decode(current location)`.

use crate::query::{QueryString, RouteParams};
use crate::route::{self, RouteState, Section};
use crate::world::Collection;

/// The address-bar location: path and query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    /// Query string including the leading `?`, or empty.
    pub search: String,
}

impl Location {
    /// Split a URL (`/path?query#fragment`) into path and query.
    pub fn parse(url: &str) -> Self {
        let without_fragment = url.split_once('#').map(|(head, _)| head).unwrap_or(url);
        let (pathname, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, query),
            None => (without_fragment, ""),
        };
        Self {
            pathname: if pathname.is_empty() { "/".to_string() } else { pathname.to_string() },
            search: if query.is_empty() { String::new() } else { format!("?{query}") },
        }
    }

    pub fn href(&self) -> String {
        format!("{}{}", self.pathname, self.search)
    }
}

/// Push/replace history, as provided by the browser.
pub trait History {
    fn location(&self) -> Location;

    /// Add a new entry and make it current.
    fn push(&mut self, url: &str);

    /// Overwrite the current entry.
    fn replace(&mut self, url: &str);
}

/// In-memory history with back/forward.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<Location>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(initial_url: &str) -> Self {
        Self {
            entries: vec![Location::parse(initial_url)],
            index: 0,
        }
    }

    /// Number of entries, including ones ahead of the cursor.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move back one entry. Returns false at the start.
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Move forward one entry. Returns false at the end.
    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(route::BASE_PATH)
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        self.entries[self.index].clone()
    }

    fn push(&mut self, url: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(Location::parse(url));
        self.index = self.entries.len() - 1;
    }

    fn replace(&mut self, url: &str) {
        self.entries[self.index] = Location::parse(url);
    }
}

/// Keeps a [`History`] and the decoded [`RouteState`] consistent.
pub struct Navigator<H: History> {
    history: H,
    state: RouteState,
}

impl<H: History> Navigator<H> {
    /// Wrap a history, decoding its current location.
    pub fn new(history: H) -> Self {
        let location = history.location();
        let state = route::decode(&location.pathname, &location.search);
        Self { history, state }
    }

    /// The current route.
    pub fn state(&self) -> &RouteState {
        &self.state
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Mutable access for back/forward. Call [`Navigator::handle_location_change`] afterwards.
    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    pub fn location(&self) -> Location {
        self.history.location()
    }

    /// Re-decode after the history changed underneath us (back/forward,
    /// deep links).
    pub fn handle_location_change(&mut self) -> &RouteState {
        let location = self.history.location();
        self.state = route::decode(&location.pathname, &location.search);
        tracing::debug!(href = %location.href(), section = %self.state.section, "route synced from location");
        &self.state
    }

    /// Go to a section, dropping all list parameters. Pushes an entry.
    pub fn navigate_to_section(&mut self, section: Section, subsection: Option<Collection>) {
        let path = route::route_path(section, subsection);
        self.history.push(path);
        self.handle_location_change();
    }

    /// Go to a section with the given parameters. Pushes an entry.
    pub fn navigate_with_params(
        &mut self,
        section: Section,
        subsection: Option<Collection>,
        params: &RouteParams,
    ) {
        let path = route::route_path(section, subsection);
        let url = format!("{path}{}", QueryString::from_params(params).to_search());
        self.history.push(&url);
        self.handle_location_change();
    }

    /// Merge parameters into the current query. Replaces the current entry
    /// so list tweaks do not pile up in back-button history.
    pub fn update_params(&mut self, params: &RouteParams) {
        let location = self.history.location();
        let mut query = QueryString::parse(&location.search);
        query.merge(params);
        let url = format!("{}{}", location.pathname, query.to_search());
        self.history.replace(&url);
        self.handle_location_change();
    }

    /// Whether the current route is at the given section and subsection.
    pub fn is_current_route(&self, section: Section, subsection: Option<Collection>) -> bool {
        self.state.is_at(section, subsection)
    }

    /// Key-based variant of [`Navigator::navigate_to_section`] for links
    /// built from strings. Unknown sections keep their legacy query form.
    pub fn navigate_to_keys(&mut self, section: &str, subsection: &str) {
        let url = route::encode_path(section, subsection);
        self.history.push(&url);
        self.handle_location_change();
    }
}
