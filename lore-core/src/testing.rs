//! Testing utilities for the world builder.
//!
//! This module provides tools for integration testing:
//! - `MockGenerator` for deterministic field assist without API calls
//! - `TestHarness` for driving a studio over in-memory history and storage
//! - Fixtures and assertion helpers

use crate::assist::{GenerateError, TextGenerator};
use crate::config::StudioConfig;
use crate::history::MemoryHistory;
use crate::project::{Project, ProjectId};
use crate::route::{Section, BASE_PATH};
use crate::store::{MemoryStore, WorldStore};
use crate::studio::Studio;
use crate::world::{
    Collection, EntityId, EntityRecord, Event, Fields, Location, MagicSystem, People, World,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A scripted reply from the mock generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    Text(String),
    Failure(String),
}

/// A generator that returns scripted replies in order.
///
/// Once the script runs out every call fails. Prompts are recorded so
/// tests can check what would have been sent.
#[derive(Debug, Default)]
pub struct MockGenerator {
    replies: Mutex<VecDeque<MockReply>>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.queue(MockReply::Text(text.into()));
        self
    }

    /// Queue a failure.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.queue(MockReply::Failure(message.into()));
        self
    }

    pub fn queue(&self, reply: MockReply) {
        lock(&self.replies).push_back(reply);
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Replies not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        lock(&self.prompts).push(prompt.to_string());
        match lock(&self.replies).pop_front() {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Failure(message)) => Err(GenerateError::Failed(message)),
            None => Err(GenerateError::Failed("no scripted reply".to_string())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A studio over a [`MemoryStore`] with one project and a [`MemoryHistory`].
pub struct TestHarness {
    pub studio: Studio<MemoryStore, MemoryHistory>,
    pub project: ProjectId,
}

impl TestHarness {
    /// Start at the world-builder overview.
    pub fn new() -> Self {
        Self::at(BASE_PATH)
    }

    /// Start at `url`.
    pub fn at(url: &str) -> Self {
        Self::with_config(StudioConfig::new().with_start_url(url))
    }

    /// Start at `config.start_url`.
    pub fn with_config(config: StudioConfig) -> Self {
        Self::with_world(config, World::new())
    }

    /// Start at `config.start_url` with a project whose world is `world`.
    pub fn with_world(config: StudioConfig, world: World) -> Self {
        let mut store = MemoryStore::new();
        let project = store.add_project(Project::new("Test Project"));
        for collection in Collection::ALL {
            for record in world.records(*collection) {
                let id = record.meta().id;
                if let Some(record) = world.find(*collection, id) {
                    store
                        .add_item(project, record)
                        .unwrap_or_else(|e| panic!("fixture record rejected: {e}"));
                }
            }
        }
        let studio = Studio::new(store, MemoryHistory::new(&config.start_url), project, config);
        Self { studio, project }
    }

    /// Add a record straight to the store.
    pub fn add(&mut self, record: EntityRecord) -> EntityId {
        let project = self.project;
        self.studio
            .store_mut()
            .add_item(project, record)
            .unwrap_or_else(|e| panic!("record rejected: {e}"))
    }

    pub fn add_location(&mut self, name: &str, kind: &str) -> EntityId {
        self.add(EntityRecord::Location(Location {
            name: name.to_string(),
            kind: kind.to_string(),
            ..Default::default()
        }))
    }

    /// Names of the visible records, in display order.
    pub fn visible_names(&self) -> Vec<String> {
        self.studio
            .visible_records()
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    }

    /// The address bar.
    pub fn href(&self) -> String {
        self.studio.navigator().location().href()
    }

    pub fn world(&self) -> &World {
        self.studio
            .world()
            .unwrap_or_else(|| panic!("harness project missing"))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// A small world with records in every section.
pub fn sample_world() -> World {
    let mut world = World::new();
    world.locations = vec![
        Location {
            name: "Cidade da Lua".to_string(),
            kind: "city".to_string(),
            description: "A harbor city under a pale moon".to_string(),
            population: Some(12_000),
            ..Default::default()
        },
        Location {
            name: "Vila do Sol".to_string(),
            kind: "village".to_string(),
            description: "Farmers and sunflowers".to_string(),
            population: Some(300),
            ..Default::default()
        },
        Location {
            name: "Porto Velho".to_string(),
            kind: "city".to_string(),
            description: "Old docks, older smugglers".to_string(),
            population: Some(45_000),
            ..Default::default()
        },
    ];
    world.peoples = vec![People {
        name: "Tidefolk".to_string(),
        kind: "human".to_string(),
        ..Default::default()
    }];
    world.magic_systems = vec![MagicSystem {
        name: "Runecraft".to_string(),
        kind: "arcane".to_string(),
        source: "Carved runes".to_string(),
        ..Default::default()
    }];
    world.events = vec![
        Event {
            name: "The Flood".to_string(),
            year: Some(87),
            ..Default::default()
        },
        Event {
            name: "The Founding".to_string(),
            year: Some(950),
            ..Default::default()
        },
    ];
    world
}

// ============================================================================
// Assertions
// ============================================================================

/// Assert the visible list, in order.
pub fn assert_visible(harness: &TestHarness, expected: &[&str]) {
    let names = harness.visible_names();
    assert_eq!(names, expected, "unexpected visible records at {}", harness.href());
}

/// Assert the current route's section and subsection.
pub fn assert_route(harness: &TestHarness, section: Section, subsection: Option<Collection>) {
    let route = harness.studio.route();
    assert!(
        route.is_at(section, subsection),
        "expected {section}/{subsection:?}, at {}",
        harness.href()
    );
}
