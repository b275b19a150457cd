//! Projects and their JSON backup format.
//!
//! A project is the unit of export and import. The export is a single JSON
//! object: the project's own fields, optionally its world, plus
//! `exportDate` and `version`.

use crate::world::World;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Current export format version.
pub const EXPORT_VERSION: u32 = 1;

/// Errors from reading an export.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Project name is required")]
    MissingName,
}

/// Unique identifier for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(Uuid);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chapter of the novel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub order: u32,
}

impl Chapter {
    pub fn new(title: impl Into<String>, order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: String::new(),
            order,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// A light-novel project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: String,
    /// Word count goal; zero means no target.
    #[serde(default)]
    pub target_word_count: u32,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            name: name.into(),
            description: String::new(),
            genre: String::new(),
            target_word_count: 0,
            chapters: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_target_word_count(mut self, target: u32) -> Self {
        self.target_word_count = target;
        self
    }

    /// Append a chapter at the end.
    pub fn add_chapter(&mut self, title: impl Into<String>, content: impl Into<String>) -> Uuid {
        let order = self.chapters.iter().map(|c| c.order.saturating_add(1)).max().unwrap_or(0);
        let chapter = Chapter::new(title, order).with_content(content);
        let id = chapter.id;
        self.chapters.push(chapter);
        self.updated_at = Utc::now();
        id
    }

    /// Chapters sorted by their `order`.
    pub fn ordered_chapters(&self) -> Vec<&Chapter> {
        let mut chapters: Vec<_> = self.chapters.iter().collect();
        chapters.sort_by_key(|c| c.order);
        chapters
    }

    pub fn stats(&self) -> ProjectStats {
        let word_count: usize = self.chapters.iter().map(Chapter::word_count).sum();
        let progress_percent = if self.target_word_count == 0 {
            None
        } else {
            let ratio = word_count as f64 / f64::from(self.target_word_count) * 100.0;
            Some(ratio.min(100.0).round() as u8)
        };

        ProjectStats {
            word_count,
            chapter_count: self.chapters.len(),
            progress_percent,
        }
    }
}

/// Derived writing metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub word_count: usize,
    pub chapter_count: usize,
    /// Progress toward the target word count, clamped to 100.
    pub progress_percent: Option<u8>,
}

// ============================================================================
// Export / import
// ============================================================================

/// The backup file written by export and read by import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectExport {
    #[serde(flatten)]
    pub project: Project,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world: Option<World>,

    pub export_date: DateTime<Utc>,

    pub version: u32,
}

impl ProjectExport {
    pub fn new(project: Project, world: Option<World>) -> Self {
        Self {
            project,
            world,
            export_date: Utc::now(),
            version: EXPORT_VERSION,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and check an export.
    pub fn from_json(text: &str) -> Result<Self, ImportError> {
        // Check the version before the full parse so an incompatible
        // file reports a version mismatch rather than a field error.
        #[derive(Deserialize)]
        struct Partial {
            version: u32,
        }

        let partial: Partial = serde_json::from_str(text)?;
        if partial.version != EXPORT_VERSION {
            return Err(ImportError::VersionMismatch {
                expected: EXPORT_VERSION,
                found: partial.version,
            });
        }

        let export: Self = serde_json::from_str(text)?;
        if export.project.name.trim().is_empty() {
            return Err(ImportError::MissingName);
        }
        Ok(export)
    }
}

/// Build a download file name for a project export.
pub fn export_file_name(project: &Project) -> String {
    let sanitized = project
        .name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>();
    format!("{sanitized}_backup.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{EntityRecord, Location};

    #[test]
    fn test_stats() {
        let mut project = Project::new("Lua Crescente").with_target_word_count(10);
        project.add_chapter("Prólogo", "A lua nasceu sobre o mar");
        project.add_chapter("Capítulo 1", "  ");

        let stats = project.stats();
        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.chapter_count, 2);
        assert_eq!(stats.progress_percent, Some(60));
    }

    #[test]
    fn test_progress_clamps_and_handles_no_target() {
        let mut project = Project::new("Long");
        project.add_chapter("One", "a b c d e");
        assert_eq!(project.stats().progress_percent, None);

        project.target_word_count = 2;
        assert_eq!(project.stats().progress_percent, Some(100));
    }

    #[test]
    fn test_chapter_ordering() {
        let mut project = Project::new("Ordered");
        project.add_chapter("First", "");
        project.add_chapter("Second", "");
        project.chapters.swap(0, 1);

        let titles: Vec<_> = project.ordered_chapters().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn test_add_chapter_after_max_order() {
        let mut project = Project::new("Imported");
        project.chapters.push(Chapter::new("Last", u32::MAX));
        project.add_chapter("After", "");

        assert_eq!(project.chapters.len(), 2);
        assert_eq!(project.chapters[1].order, u32::MAX);
    }

    #[test]
    fn test_export_shape() {
        let project = Project::new("Mar de Estrelas").with_genre("fantasy");
        let export = ProjectExport::new(project, None);
        let json: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();

        assert_eq!(json["name"], "Mar de Estrelas");
        assert_eq!(json["genre"], "fantasy");
        assert_eq!(json["version"], EXPORT_VERSION);
        assert!(json.get("exportDate").is_some());
        assert!(json.get("world").is_none());
    }

    #[test]
    fn test_export_roundtrip_with_world() {
        let mut world = World::new();
        world
            .add_record(EntityRecord::Location(Location {
                name: "Porto Estelar".to_string(),
                ..Default::default()
            }))
            .unwrap();
        let project = Project::new("Mar de Estrelas");
        let text = ProjectExport::new(project.clone(), Some(world.clone()))
            .to_json()
            .unwrap();

        let back = ProjectExport::from_json(&text).unwrap();
        assert_eq!(back.project, project);
        assert_eq!(back.world, Some(world));
    }

    #[test]
    fn test_import_rejects_other_versions() {
        let mut json = serde_json::to_value(ProjectExport::new(Project::new("x"), None)).unwrap();
        json["version"] = serde_json::json!(99);
        let err = ProjectExport::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::VersionMismatch {
                expected: EXPORT_VERSION,
                found: 99
            }
        ));
    }

    #[test]
    fn test_import_rejects_garbage_and_blank_names() {
        assert!(matches!(
            ProjectExport::from_json("not json"),
            Err(ImportError::Json(_))
        ));

        let blank = ProjectExport::new(Project::new("  "), None).to_json().unwrap();
        assert!(matches!(
            ProjectExport::from_json(&blank),
            Err(ImportError::MissingName)
        ));
    }

    #[test]
    fn test_export_file_name() {
        let project = Project::new("Lua & Sol!");
        assert_eq!(export_file_name(&project), "Lua___Sol__backup.json");
    }
}
