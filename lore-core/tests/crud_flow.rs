//! CRUD tests: dispatcher semantics and the studio create/edit/delete flow.
//!
//! Run with: `cargo test -p lore-core --test crud_flow`

use lore_core::dispatch::{self, CrudError, ValidationError};
use lore_core::filter::{filter_and_sort, ListQuery};
use lore_core::route::FILTER_ALL;
use lore_core::testing::{assert_visible, sample_world, TestHarness};
use lore_core::world::{Event, Fields, Location};
use lore_core::{Collection, SortOrder, StudioConfig};

fn location(name: &str) -> Location {
    Location {
        name: name.to_string(),
        ..Default::default()
    }
}

// =============================================================================
// DISPATCHER
// =============================================================================

#[test]
fn test_created_record_is_found_by_search() {
    let (locations, id) = dispatch::create(&[], location("Cidade da Lua")).unwrap();

    let found = filter_and_sort(
        &locations,
        &ListQuery::new("lua", FILTER_ALL, "name", SortOrder::Asc),
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].meta.id, id);
}

#[test]
fn test_blank_name_is_rejected_without_write() {
    let (locations, _) = dispatch::create(&[], location("Porto")).unwrap();
    let err = dispatch::create(&locations, location("")).unwrap_err();
    assert_eq!(err, CrudError::Validation(ValidationError::MissingName));
    assert_eq!(locations.len(), 1);
}

#[test]
fn test_update_with_same_data_only_advances_updated_at() {
    let (items, id) = dispatch::create(&[], location("Porto")).unwrap();
    let before = items[0].clone();

    let after = dispatch::update(&items, id, before.clone()).unwrap();
    let updated = &after[0];

    assert_eq!(updated.meta.id, before.meta.id);
    assert_eq!(updated.meta.created_at, before.meta.created_at);
    assert!(updated.meta.updated_at > before.meta.updated_at);

    let mut normalized = updated.clone();
    normalized.meta.updated_at = before.meta.updated_at;
    assert_eq!(normalized, before);
}

#[test]
fn test_repeated_updates_strictly_increase_updated_at() {
    let (mut items, id) = dispatch::create(&[], location("Porto")).unwrap();
    let mut last = items[0].meta.updated_at;
    for _ in 0..20 {
        items = dispatch::update(&items, id, items[0].clone()).unwrap();
        assert!(items[0].meta.updated_at > last);
        last = items[0].meta.updated_at;
    }
}

#[test]
fn test_double_remove_is_a_noop() {
    let (items, a) = dispatch::create(&[], location("A")).unwrap();
    let (items, _) = dispatch::create(&items, location("B")).unwrap();

    let once = dispatch::remove(&items, a);
    assert_eq!(dispatch::remove(&once, a), once);
}

#[test]
fn test_sort_desc_is_exact_reverse_of_asc() {
    let world = sample_world();
    for sort_by in ["name", "type", "population", "description"] {
        let asc = filter_and_sort(
            &world.locations,
            &ListQuery::new("", FILTER_ALL, sort_by, SortOrder::Asc),
        );
        let mut desc = filter_and_sort(
            &world.locations,
            &ListQuery::new("", FILTER_ALL, sort_by, SortOrder::Desc),
        );
        desc.reverse();
        let asc_ids: Vec<_> = asc.iter().map(|r| r.meta.id).collect();
        let desc_ids: Vec<_> = desc.iter().map(|r| r.meta.id).collect();
        assert_eq!(asc_ids, desc_ids, "sort by {sort_by}");
    }
}

#[test]
fn test_numeric_sort_on_events() {
    let mut events = vec![
        Event {
            name: "Third".to_string(),
            year: Some(1203),
            ..Default::default()
        },
        Event {
            name: "First".to_string(),
            year: Some(87),
            ..Default::default()
        },
    ];
    events.push(Event {
        name: "Second".to_string(),
        year: Some(950),
        ..Default::default()
    });

    let sorted = filter_and_sort(
        &events,
        &ListQuery::new("", FILTER_ALL, "year", SortOrder::Asc),
    );
    let names: Vec<_> = sorted.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
}

// =============================================================================
// STUDIO
// =============================================================================

fn sample_harness(url: &str) -> TestHarness {
    TestHarness::with_world(StudioConfig::new().with_start_url(url), sample_world())
}

#[test]
fn test_list_search_filter_and_sort() {
    let mut harness = sample_harness("/world-builder/geography/locations");
    assert_visible(&harness, &["Cidade da Lua", "Porto Velho", "Vila do Sol"]);

    harness.studio.set_filter_type("city");
    assert_visible(&harness, &["Cidade da Lua", "Porto Velho"]);

    harness.studio.set_sort("population", SortOrder::Desc);
    assert_visible(&harness, &["Porto Velho", "Cidade da Lua"]);

    harness.studio.set_search("DOCKS");
    assert_visible(&harness, &["Porto Velho"]);
}

#[test]
fn test_section_without_subsection_lists_nothing() {
    let harness = sample_harness("/world-builder/geography");
    assert!(harness.studio.visible_records().is_empty());
    assert!(harness.studio.type_options().is_empty());
}

#[test]
fn test_edit_existing_record() {
    let mut harness = sample_harness("/world-builder/history/events");
    let id = harness.world().events[0].meta.id;

    harness.studio.open_edit(id).unwrap();
    assert!(harness.studio.set_field("name", "The Great Flood"));
    assert!(harness.studio.set_field("year", "88"));
    assert_eq!(harness.studio.submit(), Some(id));

    let event = &harness.world().events[0];
    assert_eq!(event.name, "The Great Flood");
    assert_eq!(event.year, Some(88));
}

#[test]
fn test_open_edit_outside_active_collection_fails() {
    let mut harness = sample_harness("/world-builder/geography/locations");
    let event_id = harness.world().events[0].meta.id;

    assert!(harness.studio.open_edit(event_id).is_none());
    assert!(!harness.studio.editor().is_open());
    assert_eq!(harness.studio.drain_notices().len(), 1);
}

#[test]
fn test_failed_submit_keeps_editor_open() {
    let mut harness = sample_harness("/world-builder/geography/regions");
    harness.studio.open_create().unwrap();
    harness.studio.set_field("name", "   ");

    assert_eq!(harness.studio.submit(), None);
    assert!(harness.studio.editor().is_open());
    assert!(harness.world().regions.is_empty());

    harness.studio.set_field("name", "Northern Reach");
    assert!(harness.studio.submit().is_some());
    assert_eq!(harness.world().regions.len(), 1);
}

#[test]
fn test_delete_only_after_confirmation() {
    let mut harness = sample_harness("/world-builder/geography/locations");
    let id = harness.world().locations[1].meta.id;

    harness.studio.request_delete(id);
    assert_eq!(harness.world().locations.len(), 3);
    assert!(harness.studio.confirm_delete());
    assert_eq!(harness.world().locations.len(), 2);
    assert!(harness
        .world()
        .find(Collection::Locations, id)
        .is_none());
}
