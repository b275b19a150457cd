//! Navigation tests: path table, query layer and history behavior.
//!
//! Run with: `cargo test -p lore-core --test navigation`

use lore_core::history::{History, MemoryHistory, Navigator};
use lore_core::route::{self, RouteState, ROUTES};
use lore_core::testing::{assert_route, TestHarness};
use lore_core::{Collection, RouteParams, Section, SortOrder, ViewMode};

fn defaults(section: Section, subsection: Option<Collection>) -> RouteState {
    RouteState::new(section, subsection)
}

// =============================================================================
// PATH TABLE
// =============================================================================

#[test]
fn test_every_route_roundtrips_with_defaults() {
    for entry in ROUTES {
        let sub_key = entry.subsection.map(|c| c.key()).unwrap_or("");
        let path = route::encode_path(entry.section.key(), sub_key);
        assert_eq!(path, entry.path);
        assert_eq!(
            route::decode(&path, ""),
            defaults(entry.section, entry.subsection),
            "roundtrip failed for {path}"
        );
    }
}

#[test]
fn test_magic_systems_path_decodes_with_defaults() {
    let state = route::decode("/world-builder/systems/magic", "");
    assert_eq!(state.section, Section::Systems);
    assert_eq!(state.subsection, Some(Collection::MagicSystems));
    assert_eq!(state.view_mode, ViewMode::Grid);
    assert_eq!(state.search, "");
    assert_eq!(state.filter_type, "all");
    assert_eq!(state.sort_by, "name");
    assert_eq!(state.sort_order, SortOrder::Asc);
}

#[test]
fn test_unmapped_paths_never_fail() {
    let paths = [
        "",
        "/",
        "/nowhere",
        "/world-builder/geography/dragons",
        "/world-builder/systems/magic/extra",
        "//",
        "/world-builder/%zz",
    ];
    for path in paths {
        let state = route::decode(path, "?tab=%%%&subTab=");
        assert!(Section::ALL.contains(&state.section), "bad section for {path}");
        assert_eq!(state.section, Section::Overview);
        assert_eq!(state.subsection, None);
    }
}

#[test]
fn test_legacy_query_is_honored_on_unmapped_paths() {
    let state = route::decode("/old-builder", "?tab=cultures&subTab=religions&search=sun");
    assert_eq!(state.section, Section::Cultures);
    assert_eq!(state.subsection, Some(Collection::Religions));
    assert_eq!(state.search, "sun");

    let mismatched = route::decode("/old-builder", "?tab=cultures&subTab=magicSystems");
    assert_eq!(mismatched.section, Section::Cultures);
    assert_eq!(mismatched.subsection, None);
}

#[test]
fn test_bad_enum_values_fall_back() {
    let state = route::decode(
        "/world-builder/history/events",
        "?viewMode=table&sortOrder=sideways&sortBy=year",
    );
    assert_eq!(state.view_mode, ViewMode::Grid);
    assert_eq!(state.sort_order, SortOrder::Asc);
    assert_eq!(state.sort_by, "year");
}

// =============================================================================
// HISTORY
// =============================================================================

#[test]
fn test_navigate_with_params_omits_empty_values() {
    let mut nav = Navigator::new(MemoryHistory::default());
    nav.navigate_with_params(
        Section::Geography,
        Some(Collection::Locations),
        &RouteParams::new()
            .view_mode(ViewMode::Grid)
            .search("cidade")
            .filter_type("city")
            .sort_by(""),
    );

    assert_eq!(
        nav.location().href(),
        "/world-builder/geography/locations?viewMode=grid&search=cidade&filterType=city"
    );
    assert_eq!(nav.state().filter_type, "city");
}

#[test]
fn test_update_params_replaces_history_entry() {
    let mut nav = Navigator::new(MemoryHistory::default());
    nav.navigate_to_section(Section::Systems, Some(Collection::MagicSystems));
    let entries = nav.history().len();

    nav.update_params(&RouteParams::new().search("magia"));

    assert_eq!(nav.history().len(), entries);
    assert_eq!(nav.state().search, "magia");
    assert!(nav.is_current_route(Section::Systems, Some(Collection::MagicSystems)));

    let location = nav.history().location();
    assert_eq!(
        route::decode(&location.pathname, &location.search),
        *nav.state()
    );
}

#[test]
fn test_query_values_are_percent_encoded() {
    let mut nav = Navigator::new(MemoryHistory::new("/world-builder/cultures/peoples"));
    nav.update_params(&RouteParams::new().search("povo do mar & sol"));

    let href = nav.location().href();
    assert!(!href.contains(' '), "unencoded space in {href}");
    assert_eq!(nav.state().search, "povo do mar & sol");

    // A fresh decode of the written URL gives the same state.
    let reloaded = Navigator::new(MemoryHistory::new(&href));
    assert_eq!(reloaded.state(), nav.state());
}

#[test]
fn test_back_button_restores_list_state() {
    let mut harness = TestHarness::at("/world-builder/geography/locations?search=lua&viewMode=list");
    harness
        .studio
        .select_section(Section::History, Some(Collection::Events));
    assert_eq!(harness.studio.route().search, "");
    harness.studio.open_create().unwrap();

    assert!(harness.studio.navigator_mut().history_mut().back());
    harness.studio.handle_location_change();

    assert_route(&harness, Section::Geography, Some(Collection::Locations));
    assert_eq!(harness.studio.route().search, "lua");
    assert_eq!(harness.studio.route().view_mode, ViewMode::List);
    assert!(!harness.studio.editor().is_open());
}

#[tokio::test]
async fn test_back_button_drops_pending_assist() {
    let generator = lore_core::testing::MockGenerator::new().with_response("Too late.");
    let mut harness = TestHarness::at("/world-builder/geography/locations");
    harness
        .studio
        .select_section(Section::History, Some(Collection::Events));
    harness.studio.open_create().unwrap();
    let ticket = harness.studio.start_assist("description").unwrap();

    assert!(harness.studio.navigator_mut().history_mut().back());
    harness.studio.handle_location_change();

    let outcome = ticket.run(&generator).await;
    assert!(!harness.studio.finish_assist(outcome));
    assert!(!harness.studio.editor().is_open());
}

#[test]
fn test_query_only_change_keeps_draft() {
    let mut harness = TestHarness::at("/world-builder/geography/locations");
    harness.studio.set_search("lua");
    harness.studio.open_create().unwrap();

    harness.studio.handle_location_change();
    assert!(harness.studio.editor().is_open());
}

#[test]
fn test_search_is_written_as_typed() {
    let mut harness = TestHarness::at("/world-builder/geography/locations");
    harness.studio.set_search(" porto ");
    assert_eq!(harness.studio.route().search, " porto ");
}

#[test]
fn test_list_controls_write_the_url() {
    let mut harness = TestHarness::at("/world-builder/geography/locations");
    harness.studio.set_view_mode(ViewMode::List);
    harness.studio.set_filter_type("city");
    harness.studio.set_sort("population", SortOrder::Desc);
    assert_eq!(
        harness.href(),
        "/world-builder/geography/locations?viewMode=list&filterType=city&sortBy=population&sortOrder=desc"
    );

    harness.studio.set_filter_type("all");
    assert_eq!(
        harness.href(),
        "/world-builder/geography/locations?viewMode=list&sortBy=population&sortOrder=desc"
    );
    assert_eq!(harness.studio.route().filter_type, "all");
    assert_eq!(harness.studio.navigator().history().len(), 1);
}
