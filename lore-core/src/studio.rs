//! The world-builder page controller.
//!
//! A [`Studio`] ties the pieces together for one project: the
//! [`Navigator`] owns the route, the injected [`WorldStore`] owns the data,
//! and the [`Editor`] owns the draft being edited. User-facing failures are
//! never returned as errors; they become [`Notice`]s in a bounded queue,
//! like toasts.
//!
//! # Example
//!
//! ```ignore
//! use lore_core::{MemoryHistory, MemoryStore, Project, Studio, StudioConfig, WorldStore};
//! use lore_core::{Collection, Section};
//!
//! let mut store = MemoryStore::new();
//! let project = store.add_project(Project::new("Lua Crescente"));
//! let mut studio = Studio::new(store, MemoryHistory::default(), project, StudioConfig::new());
//!
//! studio.select_section(Section::Geography, Some(Collection::Locations));
//! studio.open_create();
//! studio.set_field("name", "Cidade da Lua");
//! studio.submit();
//!
//! studio.set_search("lua");
//! assert_eq!(studio.visible_records().len(), 1);
//! ```

use crate::assist::TextGenerator;
use crate::config::StudioConfig;
use crate::editor::{AssistApplied, AssistOutcome, AssistTicket, Editor};
use crate::filter::{filter_and_sort, ListQuery};
use crate::history::{History, Navigator};
use crate::project::{Project, ProjectId};
use crate::query::RouteParams;
use crate::route::{RouteState, Section, SortOrder, ViewMode, FILTER_ALL};
use crate::store::WorldStore;
use crate::world::{Collection, EntityId, Fields, World};
use std::collections::{BTreeSet, VecDeque};

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// The editor field the message is about, if any.
    pub field: Option<String>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            field: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            field: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            field: None,
        }
    }

    pub fn for_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Controller for the world-builder page of one project.
pub struct Studio<S: WorldStore, H: History> {
    navigator: Navigator<H>,
    store: S,
    editor: Editor,
    project: ProjectId,
    pending_delete: Option<(Collection, EntityId)>,
    notices: VecDeque<Notice>,
    config: StudioConfig,
}

impl<S: WorldStore, H: History> Studio<S, H> {
    /// Create a studio for `project`, decoding the history's current location.
    pub fn new(store: S, history: H, project: ProjectId, config: StudioConfig) -> Self {
        Self {
            navigator: Navigator::new(history),
            store,
            editor: Editor::new(),
            project,
            pending_delete: None,
            notices: VecDeque::new(),
            config,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn route(&self) -> &RouteState {
        self.navigator.state()
    }

    pub fn navigator(&self) -> &Navigator<H> {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator<H> {
        &mut self.navigator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn project_id(&self) -> ProjectId {
        self.project
    }

    pub fn project(&self) -> Option<&Project> {
        self.store.project(self.project)
    }

    /// The project's world. `None` if the project was removed from the store.
    pub fn world(&self) -> Option<&World> {
        self.store.world(self.project).ok()
    }

    // ========================================================================
    // Notices
    // ========================================================================

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Take all queued notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    fn notify(&mut self, notice: Notice) {
        if self.notices.len() >= self.config.notice_capacity {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// The active collection with the route's search, filter and sort applied.
    pub fn visible_records(&self) -> Vec<&dyn Fields> {
        let Some(world) = self.world() else {
            return Vec::new();
        };
        let route = self.navigator.state();
        filter_and_sort(world.active_collection(route), &ListQuery::from(route))
    }

    /// Distinct `type` values of the active collection, for the filter menu.
    pub fn type_options(&self) -> Vec<String> {
        let Some(world) = self.world() else {
            return Vec::new();
        };
        world
            .active_collection(self.navigator.state())
            .into_iter()
            .map(|r| r.kind_tag().trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn active_collection(&self) -> Option<Collection> {
        let route = self.navigator.state();
        route
            .subsection
            .filter(|collection| collection.section() == route.section)
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Go to a section. An open editor is closed and its draft discarded.
    pub fn select_section(&mut self, section: Section, subsection: Option<Collection>) {
        if self.editor.cancel() {
            tracing::debug!("draft discarded on navigation");
        }
        self.pending_delete = None;
        self.navigator.navigate_to_section(section, subsection);
    }

    /// Re-read the route after a back/forward or external change.
    pub fn handle_location_change(&mut self) {
        let before = (self.route().section, self.route().subsection);
        self.navigator.handle_location_change();
        if before != (self.route().section, self.route().subsection) && self.editor.cancel() {
            tracing::debug!("draft discarded on history navigation");
        }
        if self.active_collection() != self.pending_delete.map(|(c, _)| c) {
            self.pending_delete = None;
        }
    }

    pub fn set_search(&mut self, search: &str) {
        self.navigator
            .update_params(&RouteParams::new().search(search));
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.navigator
            .update_params(&RouteParams::new().view_mode(view_mode));
    }

    /// Filter by `type`; `"all"` or an empty value clears the filter.
    pub fn set_filter_type(&mut self, filter_type: &str) {
        let value = if filter_type == FILTER_ALL { "" } else { filter_type };
        self.navigator
            .update_params(&RouteParams::new().filter_type(value));
    }

    pub fn set_sort(&mut self, sort_by: &str, sort_order: SortOrder) {
        self.navigator.update_params(
            &RouteParams::new()
                .sort_by(sort_by)
                .sort_order(sort_order),
        );
    }

    /// Flip the sort order, keeping the sort key.
    pub fn toggle_sort_order(&mut self) {
        let order = self.navigator.state().sort_order.reversed();
        self.navigator
            .update_params(&RouteParams::new().sort_order(order));
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Open an empty editor for the active collection.
    pub fn open_create(&mut self) -> Option<u64> {
        let Some(collection) = self.active_collection() else {
            self.notify(Notice::error("Choose a category before adding an entry"));
            return None;
        };
        Some(self.editor.open_create(collection))
    }

    /// Open an editor on a record of the active collection.
    pub fn open_edit(&mut self, id: EntityId) -> Option<u64> {
        let record = self
            .active_collection()
            .and_then(|c| self.world().and_then(|w| w.find(c, id)));
        match record {
            Some(record) => Some(self.editor.open_edit(record)),
            None => {
                self.notify(Notice::error("That entry no longer exists"));
                None
            }
        }
    }

    /// Write a field of the open draft. Failures become field notices.
    pub fn set_field(&mut self, key: &str, value: &str) -> bool {
        match self.editor.set_field(key, value) {
            Ok(()) => true,
            Err(e) => {
                self.notify(Notice::error(e.to_string()).for_field(key));
                false
            }
        }
    }

    /// Save the open draft.
    pub fn submit(&mut self) -> Option<EntityId> {
        let collection = self.editor.session().map(|s| s.collection());
        match self.editor.submit(&mut self.store, self.project) {
            Ok(id) => {
                if let Some(collection) = collection {
                    self.notify(Notice::success(format!(
                        "Saved {}",
                        collection.singular()
                    )));
                }
                Some(id)
            }
            Err(e) => {
                self.notify(Notice::error(e.to_string()));
                None
            }
        }
    }

    /// Close the editor without saving.
    pub fn cancel(&mut self) {
        self.editor.cancel();
    }

    // ========================================================================
    // Deleting
    // ========================================================================

    /// Ask to delete a record of the active collection. Nothing is removed
    /// until [`Studio::confirm_delete`].
    pub fn request_delete(&mut self, id: EntityId) -> bool {
        let Some(collection) = self.active_collection() else {
            return false;
        };
        self.pending_delete = Some((collection, id));
        true
    }

    pub fn pending_delete(&self) -> Option<(Collection, EntityId)> {
        self.pending_delete
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the record named by the last [`Studio::request_delete`].
    pub fn confirm_delete(&mut self) -> bool {
        let Some((collection, id)) = self.pending_delete.take() else {
            return false;
        };
        match self.store.delete_item(self.project, collection, id) {
            Ok(()) => {
                self.notify(Notice::success(format!("Deleted {}", collection.singular())));
                true
            }
            Err(e) => {
                self.notify(Notice::error(e.to_string()));
                false
            }
        }
    }

    // ========================================================================
    // Field assist
    // ========================================================================

    /// Issue an assist ticket for a field of the open draft.
    pub fn start_assist(&mut self, field: &str) -> Option<AssistTicket> {
        match self.editor.begin_assist(field) {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                self.notify(Notice::error(e.to_string()).for_field(field));
                None
            }
        }
    }

    /// Apply the outcome of a ticket from [`Studio::start_assist`].
    pub fn finish_assist(&mut self, outcome: AssistOutcome) -> bool {
        let field = outcome.field.clone();
        match self.editor.apply_assist(outcome) {
            Ok(AssistApplied::Written) => true,
            Ok(AssistApplied::Discarded) => false,
            Err(e) => {
                tracing::warn!(field = %field, error = %e, "field assist failed");
                self.notify(Notice::error(e.to_string()).for_field(field));
                false
            }
        }
    }

    /// Generate several fields at once and apply the results.
    ///
    /// Returns the keys that were written.
    pub async fn assist_fields<G: TextGenerator + ?Sized>(
        &mut self,
        generator: &G,
        fields: &[&str],
    ) -> Vec<String> {
        let tickets: Vec<AssistTicket> = fields
            .iter()
            .filter_map(|field| self.start_assist(field))
            .collect();

        let outcomes =
            futures::future::join_all(tickets.iter().map(|ticket| ticket.run(generator))).await;

        outcomes
            .into_iter()
            .filter_map(|outcome| {
                let field = outcome.field.clone();
                self.finish_assist(outcome).then_some(field)
            })
            .collect()
    }

    // ========================================================================
    // Import / export
    // ========================================================================

    /// Serialize the current project and its world.
    pub fn export_project(&mut self) -> Option<String> {
        match self.store.export_project(self.project) {
            Ok(json) => Some(json),
            Err(e) => {
                self.notify(Notice::error(format!("Export failed: {e}")));
                None
            }
        }
    }

    /// Import a backup as a new project. Does not switch to it.
    pub fn import_project(&mut self, json: &str) -> bool {
        let ok = self.store.import_project(json);
        if ok {
            self.notify(Notice::success("Project imported"));
        } else {
            self.notify(Notice::error("Could not import project: invalid file"));
        }
        ok
    }

    /// Switch to another project in the store.
    pub fn switch_project(&mut self, project: ProjectId) -> bool {
        if self.store.project(project).is_none() {
            return false;
        }
        self.editor.cancel();
        self.pending_delete = None;
        self.project = project;
        true
    }
}
