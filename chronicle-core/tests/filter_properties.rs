use std::fs;

use chronicle_core::{
    filter_dynasties, filter_events, filter_figures, CategoryFilter, Dataset, DynastyImportance,
    Dynasty, Event, Figure, FilterState, YearBounds, YearRange,
};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn sample_dataset() -> Dataset {
    let raw = fs::read_to_string(fixture_path("sample_timeline.json"))
        .expect("Không đọc được dữ liệu mẫu");
    serde_json::from_str(&raw).expect("Dữ liệu mẫu không hợp lệ")
}

fn dynasty_names(records: &[&Dynasty]) -> Vec<String> {
    records.iter().map(|record| record.name.clone()).collect()
}

fn event_names(records: &[&Event]) -> Vec<String> {
    records.iter().map(|record| record.name.clone()).collect()
}

fn figure_names(records: &[&Figure]) -> Vec<String> {
    records.iter().map(|record| record.name.clone()).collect()
}

#[test]
fn default_state_returns_everything_in_order() {
    let dataset = sample_dataset();
    let state = FilterState::default();
    assert_eq!(state.range, YearRange::new(-2100, 2025));

    let filtered = dataset.filter(&state);

    assert_eq!(filtered.dynasties, dataset.dynasties.iter().collect::<Vec<_>>());
    assert_eq!(filtered.events, dataset.events.iter().collect::<Vec<_>>());
    assert_eq!(filtered.figures, dataset.figures.iter().collect::<Vec<_>>());
}

#[test]
fn importance_threshold_excludes_events_and_figures_only() {
    let dataset = sample_dataset();
    let state = FilterState::default().with_min_importance(4);

    let events = filter_events(&dataset.events, &state);
    assert_eq!(
        event_names(&events),
        vec!["秦统一六国", "蔡伦改进造纸术", "安史之乱"]
    );
    assert!(events.iter().all(|event| event.importance >= 4));

    let figures = filter_figures(&dataset.figures, &state);
    assert_eq!(figure_names(&figures), vec!["秦始皇", "司马迁", "李白"]);

    // Triều đại mặc định được miễn ngưỡng quan trọng.
    let dynasties = filter_dynasties(&dataset.dynasties, &state);
    assert_eq!(dynasties.len(), dataset.dynasties.len());
    assert!(dynasties.iter().any(|dynasty| dynasty.importance < 4));
}

#[test]
fn dynasty_importance_policy_can_be_enabled() {
    let dataset = sample_dataset();
    let state = FilterState::default()
        .with_min_importance(4)
        .with_dynasty_importance(DynastyImportance::Filtered);

    let dynasties = filter_dynasties(&dataset.dynasties, &state);
    assert_eq!(dynasty_names(&dynasties), vec!["秦", "汉", "唐", "明"]);
}

#[test]
fn search_ignores_case() {
    let dataset = sample_dataset();
    let lower = dataset.filter(&FilterState::default().with_search("tang"));
    let upper = dataset.filter(&FilterState::default().with_search("TANG"));

    assert_eq!(lower, upper);
    assert_eq!(dynasty_names(&lower.dynasties), vec!["唐"]);
    assert_eq!(event_names(&lower.events), vec!["安史之乱"]);
    assert_eq!(figure_names(&lower.figures), vec!["李白"]);
}

#[test]
fn search_covers_dynasty_name_of_events_and_figures() {
    let dataset = sample_dataset();
    let state = FilterState::default().with_search("秦");

    let events = filter_events(&dataset.events, &state);
    assert_eq!(event_names(&events), vec!["秦统一六国", "大泽乡起义"]);

    let figures = filter_figures(&dataset.figures, &state);
    assert_eq!(figure_names(&figures), vec!["秦始皇"]);
}

#[test]
fn event_range_is_inclusive_at_both_ends() {
    let dataset = sample_dataset();
    let state = FilterState::default().with_range(YearRange::new(-221, 105));

    let events = filter_events(&dataset.events, &state);
    assert_eq!(
        event_names(&events),
        vec!["秦统一六国", "大泽乡起义", "蔡伦改进造纸术"]
    );
}

#[test]
fn interval_end_is_clamped_for_matching_only() {
    let han = Dynasty {
        name: "Han".into(),
        start_year: -206,
        end_year: 220,
        description: String::new(),
        color: "#C0392B".into(),
        importance: 5,
        duration: None,
    };
    let dynasties = vec![han];
    let matched = filter_dynasties(&dynasties, &FilterState::default());
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].end_year, 220);

    let dataset = sample_dataset();
    let present = FilterState::default().with_range(YearRange::new(2025, 2025));
    let dynasties = filter_dynasties(&dataset.dynasties, &present);
    assert_eq!(dynasty_names(&dynasties), vec!["中华人民共和国"]);
    assert_eq!(dynasties[0].end_year, 2100);

    let future = FilterState::default().with_range(YearRange::new(2030, 2100));
    assert!(filter_dynasties(&dataset.dynasties, &future).is_empty());
}

#[test]
fn category_all_matches_unfiltered_results() {
    let dataset = sample_dataset();
    let unfiltered = filter_events(&dataset.events, &FilterState::default());
    let all = filter_events(
        &dataset.events,
        &FilterState::default().with_category(CategoryFilter::All),
    );
    let all_from_label = filter_events(&dataset.events, &FilterState::default().with_category("all"));

    assert_eq!(unfiltered, all);
    assert_eq!(unfiltered, all_from_label);

    let military = filter_events(&dataset.events, &FilterState::default().with_category("军事"));
    assert_eq!(event_names(&military), vec!["大泽乡起义", "安史之乱"]);
}

#[test]
fn filter_state_deserializes_partial_input() {
    let state: FilterState = serde_json::from_str(
        r#"{"range": [-500, 500], "category": "文化", "min_importance": 3}"#,
    )
    .expect("FilterState không hợp lệ");

    assert_eq!(state.range, YearRange::new(-500, 500));
    assert_eq!(state.category, CategoryFilter::Only("文化".into()));
    assert_eq!(state.min_importance, 3);
    assert_eq!(state.search, "");
    assert_eq!(state.present_year, 2025);
}

#[test]
fn year_bounds_cover_all_records() {
    let dataset = sample_dataset();
    assert_eq!(
        dataset.year_bounds(),
        Some(YearBounds {
            min_year: -259,
            max_year: 2100,
        })
    );
    assert_eq!(Dataset::default().year_bounds(), None);
}
