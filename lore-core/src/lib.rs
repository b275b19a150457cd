//! World-building core for light-novel authors.
//!
//! This crate provides:
//! - Nested world-builder routes with a query-string layer for list state
//! - Thirteen entity kinds with key-addressed field schemas
//! - Generic create/update/delete over every collection
//! - AI field assist through a pluggable text generator
//! - Projects with JSON export and import
//!
//! # Quick Start
//!
//! ```ignore
//! use lore_core::{
//!     ClaudeGenerator, Collection, MemoryHistory, MemoryStore, Project, Section, Studio,
//!     StudioConfig, WorldStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StudioConfig::from_env();
//!     let generator = ClaudeGenerator::from_env(config.assist.clone())?;
//!
//!     let mut store = MemoryStore::new();
//!     let project = store.add_project(Project::new("Lua Crescente"));
//!     let mut studio = Studio::new(store, MemoryHistory::default(), project, config);
//!
//!     studio.select_section(Section::Systems, Some(Collection::MagicSystems));
//!     studio.open_create();
//!     studio.set_field("name", "Runecraft");
//!     studio.assist_fields(&generator, &["rules", "cost"]).await;
//!     studio.submit();
//!     Ok(())
//! }
//! ```

// Lets `#[derive(Fields)]` output name `::lore_core` from inside this crate.
extern crate self as lore_core;

pub mod assist;
pub mod config;
pub mod dispatch;
pub mod editor;
pub mod filter;
pub mod history;
pub mod project;
pub mod query;
pub mod route;
pub mod store;
pub mod studio;
pub mod testing;
pub mod world;

// Re-export for convenience
pub use lore_macros::Fields;

// Primary public API
pub use assist::{request_field_assist, AssistError, ClaudeGenerator, PromptTemplate, TextGenerator};
pub use config::{AssistConfig, StudioConfig};
pub use dispatch::{CrudError, ValidationError};
pub use editor::{AssistTicket, Editor, EditorError, EditorMode};
pub use filter::{filter_and_sort, ListQuery};
pub use history::{History, MemoryHistory, Navigator};
pub use project::{Project, ProjectExport, ProjectId};
pub use query::{QueryString, RouteParams};
pub use route::{decode, encode_path, RouteState, Section, SortOrder, ViewMode};
pub use store::{MemoryStore, StoreError, WorldStore};
pub use studio::{Notice, NoticeLevel, Studio};
pub use testing::{MockGenerator, TestHarness};
pub use world::{Collection, Entity, EntityId, EntityRecord, Fields, World};
