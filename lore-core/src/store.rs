//! Persistence collaborator for projects and their worlds.
//!
//! [`WorldStore`] is the read/write interface the studio is given; it never
//! reaches for a global. [`MemoryStore`] keeps everything in memory and can
//! save or load a JSON snapshot of the whole store.

use crate::dispatch::CrudError;
use crate::project::{ImportError, Project, ProjectExport, ProjectId};
use crate::world::{Collection, EntityId, EntityRecord, World};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Current snapshot file version.
const SNAPSHOT_VERSION: u32 = 1;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error(transparent)]
    Crud(#[from] CrudError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Read/write access to projects and worlds.
///
/// Reads are synchronous snapshots; writes either apply completely or
/// return an error and leave the store unchanged.
pub trait WorldStore {
    /// The world of a project.
    fn world(&self, project: ProjectId) -> Result<&World, StoreError>;

    fn add_item(&mut self, project: ProjectId, record: EntityRecord) -> Result<EntityId, StoreError>;

    fn update_item(
        &mut self,
        project: ProjectId,
        id: EntityId,
        record: EntityRecord,
    ) -> Result<(), StoreError>;

    /// Remove a record. Absent ids are not an error.
    fn delete_item(
        &mut self,
        project: ProjectId,
        collection: Collection,
        id: EntityId,
    ) -> Result<(), StoreError>;

    fn projects(&self) -> Vec<&Project>;

    fn project(&self, id: ProjectId) -> Option<&Project>;

    /// Add a project with an empty world.
    fn add_project(&mut self, project: Project) -> ProjectId;

    fn update_project(&mut self, project: Project) -> Result<(), StoreError>;

    /// Remove a project and its world. Absent ids are not an error.
    fn delete_project(&mut self, id: ProjectId);

    /// Serialize a project and its world for download.
    fn export_project(&self, id: ProjectId) -> Result<String, StoreError>;

    /// Read an export, adding it as a project.
    fn import_project_from(&mut self, json: &str) -> Result<ProjectId, StoreError>;

    /// Import returning only success, for callers that surface a toast.
    fn import_project(&mut self, json: &str) -> bool {
        match self.import_project_from(json) {
            Ok(id) => {
                tracing::info!(project = %id, "imported project");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "project import failed");
                false
            }
        }
    }
}

/// A project together with its world.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProjectEntry {
    project: Project,
    world: World,
}

/// In-memory store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    entries: HashMap<ProjectId, ProjectEntry>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: ProjectId) -> Result<&ProjectEntry, StoreError> {
        self.entries
            .get(&id)
            .ok_or(StoreError::ProjectNotFound(id))
    }

    fn entry_mut(&mut self, id: ProjectId) -> Result<&mut ProjectEntry, StoreError> {
        self.entries
            .get_mut(&id)
            .ok_or(StoreError::ProjectNotFound(id))
    }

    /// Save the whole store to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now().to_rfc3339(),
            store: self.clone(),
        };
        let content = serde_json::to_string_pretty(&snapshot)?;
        fs::write(path.as_ref(), content).await?;
        tracing::info!(path = %path.as_ref().display(), projects = self.entries.len(), "saved store");
        Ok(())
    }

    /// Load a store from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path.as_ref()).await?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: snapshot.version,
            });
        }

        tracing::info!(path = %path.as_ref().display(), saved_at = %snapshot.saved_at, "loaded store");
        Ok(snapshot.store)
    }

    /// Load from `path` if it exists, otherwise start empty.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        if fs::try_exists(path.as_ref()).await? {
            Self::load_json(path).await
        } else {
            Ok(Self::new())
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    saved_at: String,
    store: MemoryStore,
}

impl WorldStore for MemoryStore {
    fn world(&self, project: ProjectId) -> Result<&World, StoreError> {
        Ok(&self.entry(project)?.world)
    }

    fn add_item(&mut self, project: ProjectId, record: EntityRecord) -> Result<EntityId, StoreError> {
        let entry = self.entry_mut(project)?;
        Ok(entry.world.add_record(record)?)
    }

    fn update_item(
        &mut self,
        project: ProjectId,
        id: EntityId,
        record: EntityRecord,
    ) -> Result<(), StoreError> {
        let entry = self.entry_mut(project)?;
        entry.world.update_record(id, record)?;
        Ok(())
    }

    fn delete_item(
        &mut self,
        project: ProjectId,
        collection: Collection,
        id: EntityId,
    ) -> Result<(), StoreError> {
        let entry = self.entry_mut(project)?;
        entry.world.delete_record(collection, id);
        Ok(())
    }

    fn projects(&self) -> Vec<&Project> {
        let mut projects: Vec<_> = self.entries.values().map(|e| &e.project).collect();
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        projects
    }

    fn project(&self, id: ProjectId) -> Option<&Project> {
        self.entries.get(&id).map(|e| &e.project)
    }

    fn add_project(&mut self, project: Project) -> ProjectId {
        let id = project.id;
        tracing::info!(project = %id, name = %project.name, "added project");
        self.entries.insert(
            id,
            ProjectEntry {
                project,
                world: World::new(),
            },
        );
        id
    }

    fn update_project(&mut self, mut project: Project) -> Result<(), StoreError> {
        let entry = self.entry_mut(project.id)?;
        project.created_at = entry.project.created_at;
        project.updated_at = Utc::now();
        entry.project = project;
        Ok(())
    }

    fn delete_project(&mut self, id: ProjectId) {
        if self.entries.remove(&id).is_some() {
            tracing::info!(project = %id, "deleted project");
        }
    }

    fn export_project(&self, id: ProjectId) -> Result<String, StoreError> {
        let entry = self.entry(id)?;
        let export = ProjectExport::new(entry.project.clone(), Some(entry.world.clone()));
        Ok(export.to_json()?)
    }

    fn import_project_from(&mut self, json: &str) -> Result<ProjectId, StoreError> {
        let export = ProjectExport::from_json(json)?;
        let mut project = export.project;
        if self.entries.contains_key(&project.id) {
            project.id = ProjectId::new();
        }
        let id = project.id;
        self.entries.insert(
            id,
            ProjectEntry {
                project,
                world: export.world.unwrap_or_default(),
            },
        );
        Ok(id)
    }
}
