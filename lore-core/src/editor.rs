//! The entity editor state machine.
//!
//! ```text
//! Closed ── open_create / open_edit ──▶ Open ── begin_save ──▶ Saving
//!   ▲                                   │  ▲                     │
//!   └──────────── cancel ───────────────┘  └── failure ──────────┤
//!   └──────────────────────── success ───────────────────────────┘
//! ```
//!
//! Every open starts a new session. Field-assist requests are issued as
//! [`AssistTicket`]s stamped with the session; a ticket runs without
//! borrowing the editor, and its outcome is only applied if the session
//! that issued it is still the one that is open.

use crate::assist::{self, AssistError, PromptContext, PromptTemplate, TextGenerator};
use crate::project::ProjectId;
use crate::store::{StoreError, WorldStore};
use crate::world::{Collection, EntityId, EntityRecord, FieldError, Fields};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors from editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("No editor is open")]
    NotOpen,

    #[error("A save is already in progress")]
    Saving,

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Whether the editor creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Creating,
    Editing(EntityId),
}

/// State of one open editor.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSession {
    id: u64,
    mode: EditorMode,
    draft: EntityRecord,
    generating: BTreeSet<String>,
    error: Option<String>,
}

impl EditorSession {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn draft(&self) -> &EntityRecord {
        &self.draft
    }

    pub fn collection(&self) -> Collection {
        self.draft.collection()
    }

    /// Fields with an assist request in flight.
    pub fn generating(&self) -> &BTreeSet<String> {
        &self.generating
    }

    pub fn is_generating(&self, field: &str) -> bool {
        self.generating.contains(field)
    }

    /// The error from the last failed save, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorState {
    #[default]
    Closed,
    Open(EditorSession),
    Saving(EditorSession),
}

/// A pending field-assist request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistTicket {
    pub session: u64,
    pub field: String,
    pub prompt: String,
}

impl AssistTicket {
    /// Run the request. Does not touch the editor.
    pub async fn run<G: TextGenerator + ?Sized>(&self, generator: &G) -> AssistOutcome {
        AssistOutcome {
            session: self.session,
            field: self.field.clone(),
            result: assist::generate_field(generator, &self.field, &self.prompt).await,
        }
    }
}

/// The result of running an [`AssistTicket`].
#[derive(Debug)]
pub struct AssistOutcome {
    pub session: u64,
    pub field: String,
    pub result: Result<String, AssistError>,
}

/// What [`Editor::apply_assist`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistApplied {
    /// The field was written.
    Written,
    /// The session that asked is gone; nothing changed.
    Discarded,
}

/// Modal editor for one entity record at a time.
#[derive(Debug, Default)]
pub struct Editor {
    state: EditorState,
    sessions: u64,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, EditorState::Closed)
    }

    /// The open (or saving) session.
    pub fn session(&self) -> Option<&EditorSession> {
        match &self.state {
            EditorState::Open(session) | EditorState::Saving(session) => Some(session),
            EditorState::Closed => None,
        }
    }

    /// Open a blank draft. Replaces any open session.
    pub fn open_create(&mut self, collection: Collection) -> u64 {
        self.open(EditorMode::Creating, EntityRecord::blank(collection))
    }

    /// Open a copy of an existing record. Replaces any open session.
    pub fn open_edit(&mut self, record: EntityRecord) -> u64 {
        let id = record.as_fields().meta().id;
        self.open(EditorMode::Editing(id), record)
    }

    fn open(&mut self, mode: EditorMode, draft: EntityRecord) -> u64 {
        self.sessions += 1;
        let id = self.sessions;
        tracing::debug!(session = id, collection = %draft.collection(), ?mode, "editor opened");
        self.state = EditorState::Open(EditorSession {
            id,
            mode,
            draft,
            generating: BTreeSet::new(),
            error: None,
        });
        id
    }

    /// Close without saving. Returns whether a draft was discarded.
    pub fn cancel(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            EditorState::Closed => false,
            EditorState::Open(session) | EditorState::Saving(session) => {
                tracing::debug!(session = session.id, "editor cancelled");
                true
            }
        }
    }

    fn open_session_mut(&mut self) -> Result<&mut EditorSession, EditorError> {
        match &mut self.state {
            EditorState::Open(session) => Ok(session),
            EditorState::Saving(_) => Err(EditorError::Saving),
            EditorState::Closed => Err(EditorError::NotOpen),
        }
    }

    /// Write one field of the draft from text.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), EditorError> {
        let session = self.open_session_mut()?;
        session.draft.as_fields_mut().set_field(key, value)?;
        Ok(())
    }

    // ========================================================================
    // Field assist
    // ========================================================================

    /// Start generating `field`. Marks it as generating and returns the
    /// ticket to run.
    pub fn begin_assist(&mut self, field: &str) -> Result<AssistTicket, AssistError> {
        let EditorState::Open(session) = &mut self.state else {
            return Err(AssistError::NotOpen);
        };

        let collection = session.draft.collection();
        let draft = session.draft.as_fields();
        let spec = draft
            .spec(field)
            .filter(|spec| spec.assist)
            .ok_or_else(|| AssistError::UnknownField(field.to_string()))?;

        let values = PromptContext::from_draft(collection, draft, field);
        let prompt = PromptTemplate::for_field(collection, spec).render(&values);

        session.generating.insert(field.to_string());
        Ok(AssistTicket {
            session: session.id,
            field: field.to_string(),
            prompt,
        })
    }

    /// Apply a finished assist.
    ///
    /// Outcomes from another session are discarded. An outcome that lands
    /// while its own session is saving is discarded too, but its field is
    /// no longer marked as generating. A failed generation clears the
    /// generating flag and returns the error.
    pub fn apply_assist(&mut self, outcome: AssistOutcome) -> Result<AssistApplied, AssistError> {
        let session = match &mut self.state {
            EditorState::Open(session) if session.id == outcome.session => session,
            EditorState::Saving(session) if session.id == outcome.session => {
                // The draft is already handed to the store; only release the field.
                session.generating.remove(&outcome.field);
                tracing::warn!(
                    session = outcome.session,
                    field = %outcome.field,
                    "discarding assist result that arrived during save"
                );
                return Ok(AssistApplied::Discarded);
            }
            _ => {
                tracing::warn!(
                    session = outcome.session,
                    field = %outcome.field,
                    "discarding assist result for a closed editor session"
                );
                return Ok(AssistApplied::Discarded);
            }
        };

        session.generating.remove(&outcome.field);
        let text = outcome.result?;

        let draft = session.draft.as_fields_mut();
        draft
            .set_field(&outcome.field, &text)
            .map_err(|source| AssistError::Rejected {
                field: outcome.field.clone(),
                source,
            })?;
        draft.meta_mut().mark_generated(&outcome.field);

        tracing::info!(session = session.id, field = %outcome.field, "assist applied");
        Ok(AssistApplied::Written)
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Move to `Saving` and hand out what to write.
    pub fn begin_save(&mut self) -> Result<(EditorMode, EntityRecord), EditorError> {
        match std::mem::take(&mut self.state) {
            EditorState::Open(session) => {
                let pending = (session.mode, session.draft.clone());
                self.state = EditorState::Saving(session);
                Ok(pending)
            }
            other => {
                let err = match other {
                    EditorState::Saving(_) => EditorError::Saving,
                    _ => EditorError::NotOpen,
                };
                self.state = other;
                Err(err)
            }
        }
    }

    /// Finish a save: close on success, reopen with the error on failure.
    pub fn finish_save<T>(
        &mut self,
        result: Result<T, StoreError>,
    ) -> Result<T, EditorError> {
        let EditorState::Saving(mut session) = std::mem::take(&mut self.state) else {
            return Err(EditorError::NotOpen);
        };

        match result {
            Ok(value) => {
                tracing::debug!(session = session.id, "editor saved");
                Ok(value)
            }
            Err(e) => {
                session.error = Some(e.to_string());
                self.state = EditorState::Open(session);
                Err(e.into())
            }
        }
    }

    /// Save the draft to `store`. Returns the id of the written record.
    pub fn submit<S: WorldStore + ?Sized>(
        &mut self,
        store: &mut S,
        project: ProjectId,
    ) -> Result<EntityId, EditorError> {
        let (mode, draft) = self.begin_save()?;
        let result = match mode {
            EditorMode::Creating => store.add_item(project, draft),
            EditorMode::Editing(id) => store.update_item(project, id, draft).map(|()| id),
        };
        self.finish_save(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{CrudError, ValidationError};
    use crate::project::Project;
    use crate::store::MemoryStore;
    use crate::testing::MockGenerator;

    fn store_with_project() -> (MemoryStore, ProjectId) {
        let mut store = MemoryStore::new();
        let project = store.add_project(Project::new("Lua"));
        (store, project)
    }

    #[test]
    fn test_create_flow() {
        let (mut store, project) = store_with_project();
        let mut editor = Editor::new();

        editor.open_create(Collection::Locations);
        editor.set_field("name", "Cidade da Lua").unwrap();
        editor.set_field("population", "12,000").unwrap();
        let id = editor.submit(&mut store, project).unwrap();

        assert!(!editor.is_open());
        let record = store
            .world(project)
            .unwrap()
            .find(Collection::Locations, id)
            .unwrap();
        assert_eq!(record.as_fields().name(), "Cidade da Lua");
    }

    #[test]
    fn test_failed_save_reopens_with_error() {
        let (mut store, project) = store_with_project();
        let mut editor = Editor::new();
        editor.open_create(Collection::Regions);

        let err = editor.submit(&mut store, project).unwrap_err();
        assert!(matches!(
            err,
            EditorError::Store(StoreError::Crud(CrudError::Validation(
                ValidationError::MissingName
            )))
        ));
        let session = editor.session().unwrap();
        assert!(matches!(editor.state(), EditorState::Open(_)));
        assert_eq!(session.error(), Some("Validation failed: Name is required"));
        assert!(store.world(project).unwrap().is_empty());
    }

    #[test]
    fn test_edit_flow_keeps_id() {
        let (mut store, project) = store_with_project();
        let mut editor = Editor::new();
        editor.open_create(Collection::Events);
        editor.set_field("name", "The Flood").unwrap();
        let id = editor.submit(&mut store, project).unwrap();

        let record = store.world(project).unwrap().find(Collection::Events, id).unwrap();
        editor.open_edit(record);
        assert_eq!(editor.session().unwrap().mode(), EditorMode::Editing(id));
        editor.set_field("year", "-12").unwrap();
        assert_eq!(editor.submit(&mut store, project).unwrap(), id);

        let world = store.world(project).unwrap();
        assert_eq!(world.events.len(), 1);
        assert_eq!(world.events[0].year, Some(-12));
    }

    #[test]
    fn test_cancel_discards_draft() {
        let (mut store, project) = store_with_project();
        let mut editor = Editor::new();
        assert!(!editor.cancel());

        editor.open_create(Collection::Locations);
        editor.set_field("name", "Draft").unwrap();
        assert!(editor.cancel());
        assert!(matches!(editor.submit(&mut store, project), Err(EditorError::NotOpen)));
        assert!(store.world(project).unwrap().is_empty());
    }

    #[test]
    fn test_set_field_errors() {
        let mut editor = Editor::new();
        assert!(matches!(editor.set_field("name", "x"), Err(EditorError::NotOpen)));

        editor.open_create(Collection::Locations);
        assert!(matches!(
            editor.set_field("population", "many"),
            Err(EditorError::Field(FieldError::NotANumber { .. }))
        ));
        assert!(matches!(
            editor.set_field("wingspan", "3"),
            Err(EditorError::Field(FieldError::Unknown(_)))
        ));
    }

    #[test]
    fn test_saving_blocks_edits() {
        let mut editor = Editor::new();
        editor.open_create(Collection::Locations);
        editor.set_field("name", "Porto").unwrap();
        editor.begin_save().unwrap();

        assert!(matches!(editor.set_field("climate", "dry"), Err(EditorError::Saving)));
        assert!(matches!(editor.begin_save(), Err(EditorError::Saving)));
        assert!(matches!(editor.state(), EditorState::Saving(_)));
    }

    #[test]
    fn test_begin_assist_rejects_name_and_unknown_fields() {
        let mut editor = Editor::new();
        assert!(matches!(editor.begin_assist("climate"), Err(AssistError::NotOpen)));

        editor.open_create(Collection::Locations);
        assert!(matches!(editor.begin_assist("name"), Err(AssistError::UnknownField(_))));
        assert!(matches!(editor.begin_assist("type"), Err(AssistError::UnknownField(_))));
        assert!(matches!(editor.begin_assist("bogus"), Err(AssistError::UnknownField(_))));
    }

    #[tokio::test]
    async fn test_assist_writes_field_and_marks_provenance() {
        let generator = MockGenerator::new().with_response(" Misty and cold. ");
        let mut editor = Editor::new();
        editor.open_create(Collection::Locations);
        editor.set_field("name", "Cidade da Lua").unwrap();

        let ticket = editor.begin_assist("climate").unwrap();
        assert!(ticket.prompt.contains("Cidade da Lua"));
        assert!(editor.session().unwrap().is_generating("climate"));

        let outcome = ticket.run(&generator).await;
        assert_eq!(editor.apply_assist(outcome).unwrap(), AssistApplied::Written);

        let session = editor.session().unwrap();
        assert!(session.generating().is_empty());
        let draft = session.draft().as_fields();
        assert_eq!(draft.field("climate").unwrap().as_text(), "Misty and cold.");
        assert_eq!(draft.meta().generated_by, vec!["climate"]);
    }

    #[tokio::test]
    async fn test_stale_assist_is_discarded() {
        let generator = MockGenerator::new().with_response("Late answer");
        let mut editor = Editor::new();
        editor.open_create(Collection::Locations);
        let ticket = editor.begin_assist("climate").unwrap();

        editor.cancel();
        editor.open_create(Collection::Locations);

        let outcome = ticket.run(&generator).await;
        assert_eq!(editor.apply_assist(outcome).unwrap(), AssistApplied::Discarded);
        let draft = editor.session().unwrap().draft().as_fields();
        assert!(draft.field("climate").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_assist_clears_generating() {
        let generator = MockGenerator::new().with_failure("overloaded");
        let mut editor = Editor::new();
        editor.open_create(Collection::MagicSystems);

        let ticket = editor.begin_assist("rules").unwrap();
        let err = editor.apply_assist(ticket.run(&generator).await).unwrap_err();

        assert!(matches!(err, AssistError::Generator { .. }));
        assert!(!editor.session().unwrap().is_generating("rules"));
    }

    #[tokio::test]
    async fn test_non_numeric_assist_for_number_field_is_rejected() {
        let generator = MockGenerator::new().with_response("about ten thousand");
        let mut editor = Editor::new();
        editor.open_create(Collection::Locations);

        let ticket = editor.begin_assist("population").unwrap();
        let err = editor.apply_assist(ticket.run(&generator).await).unwrap_err();
        assert!(matches!(err, AssistError::Rejected { .. }));
        let draft = editor.session().unwrap().draft().as_fields();
        assert!(draft.meta().generated_by.is_empty());
    }

    #[tokio::test]
    async fn test_assist_during_save_releases_field() {
        let generator = MockGenerator::new().with_response("Misty and cold.");
        let mut editor = Editor::new();
        editor.open_create(Collection::Locations);
        let ticket = editor.begin_assist("climate").unwrap();

        editor.begin_save().unwrap();
        let outcome = ticket.run(&generator).await;
        assert_eq!(editor.apply_assist(outcome).unwrap(), AssistApplied::Discarded);

        let missing = ProjectId::new();
        assert!(editor
            .finish_save::<EntityId>(Err(StoreError::ProjectNotFound(missing)))
            .is_err());

        let session = editor.session().unwrap();
        assert!(matches!(editor.state(), EditorState::Open(_)));
        assert!(!session.is_generating("climate"));
        assert!(session.draft().as_fields().field("climate").unwrap().is_empty());

        // The field can be requested again after the failed save.
        assert!(editor.begin_assist("climate").is_ok());
    }
}
