//! Seed a world, optionally with AI field assist, and save a snapshot.
//!
//! Run with: `cargo run -p lore-core --example seed_world`
//! With Claude: `ANTHROPIC_API_KEY=... cargo run -p lore-core --example seed_world -- --assist`
//!
//! The snapshot goes to `LOREFORGE_DATA` (default `loreforge.json`).

use lore_core::testing::sample_world;
use lore_core::{
    ClaudeGenerator, Collection, Fields, MemoryHistory, MemoryStore, Project,
    Section, Studio, StudioConfig, WorldStore,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let use_assist = std::env::args().any(|arg| arg == "--assist");
    let config = StudioConfig::from_env();
    let data_path = config
        .data_path
        .clone()
        .unwrap_or_else(|| "loreforge.json".into());

    let mut store = MemoryStore::load_or_default(&data_path).await?;
    let project = store.add_project(
        Project::new("Lua Crescente")
            .with_genre("fantasy")
            .with_target_word_count(80_000),
    );

    let world = sample_world();
    for collection in Collection::ALL {
        for record in world.records(*collection) {
            if let Some(record) = world.find(*collection, record.meta().id) {
                store.add_item(project, record)?;
            }
        }
    }

    let assist = config.assist.clone();
    let history = MemoryHistory::new(&config.start_url);
    let mut studio = Studio::new(store, history, project, config);
    studio.select_section(Section::Systems, Some(Collection::MagicSystems));

    studio.open_create();
    studio.set_field("name", "Tidebinding");
    studio.set_field("type", "elemental");
    studio.set_field("source", "The pull of the twin moons on the sea");

    if use_assist {
        match ClaudeGenerator::from_env(assist) {
            Ok(generator) => {
                let written = studio
                    .assist_fields(&generator, &["description", "rules", "limitations", "cost"])
                    .await;
                println!("Generated fields: {}", written.join(", "));
            }
            Err(e) => eprintln!("Skipping assist: {e}"),
        }
    }

    studio.submit();
    for notice in studio.drain_notices() {
        println!("[{:?}] {}", notice.level, notice.message);
    }

    println!("\n{} at {}", studio.route().section, studio.navigator().location().href());
    for record in studio.visible_records() {
        println!("  - {} ({})", record.name(), record.kind_tag());
        for spec in record.specs() {
            if let Some(value) = record.field(spec.key).filter(|v| !v.is_empty()) {
                if spec.key != "name" {
                    println!("      {}: {}", spec.label, value.as_text());
                }
            }
        }
    }

    let store = studio.into_store();
    store.save_json(&data_path).await?;
    println!("\nSaved {} project(s) to {}", store.projects().len(), data_path.display());
    Ok(())
}
