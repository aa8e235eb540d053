use std::fs;

use chronicle_core::{
    detail_for, render_event_panel, render_panels, Dataset, Event, FilterState, Locale, PanelKind,
    YearRange, FALLBACK_COLOR,
};
use serde_json::{json, Value};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn sample_dataset() -> Dataset {
    let raw = fs::read_to_string(fixture_path("sample_timeline.json"))
        .expect("Không đọc được dữ liệu mẫu");
    serde_json::from_str(&raw).expect("Dữ liệu mẫu không hợp lệ")
}

fn render_json(dataset: &Dataset, state: &FilterState, locale: Locale) -> Value {
    let palette = dataset.palette();
    let panels = render_panels(&dataset.filter(state), state, &palette, locale);
    serde_json::to_value(panels).expect("Không serialize biểu đồ")
}

#[test]
fn renders_one_trace_per_panel_with_mount_targets() {
    let dataset = sample_dataset();
    let panels = render_json(&dataset, &FilterState::default(), Locale::Chinese);

    let targets: Vec<&str> = panels
        .as_array()
        .expect("danh sách bảng")
        .iter()
        .map(|panel| panel["target"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(targets, vec!["dynasty-timeline", "event-timeline", "figure-timeline"]);

    for panel in panels.as_array().unwrap() {
        assert_eq!(panel["figure"]["data"].as_array().map(Vec::len), Some(1));
        assert_eq!(panel["figure"]["layout"]["xaxis"]["range"], json!([-2100, 2025]));
        assert_eq!(panel["figure"]["layout"]["xaxis"]["title"], json!("年份"));
        assert_eq!(panel["figure"]["layout"]["xaxis"]["tickformat"], json!(".0f"));
    }
}

#[test]
fn dynasty_trace_keeps_original_end_year() {
    let dataset = sample_dataset();
    let panels = render_json(&dataset, &FilterState::default(), Locale::Chinese);
    let trace = &panels[0]["figure"]["data"][0];

    assert_eq!(trace["mode"], json!("lines"));
    assert_eq!(trace["type"], json!("scatter"));
    assert_eq!(trace["x"][0], json!([-221, -207]));
    assert_eq!(trace["x"][4], json!([1949, 2100]));
    assert_eq!(trace["line"]["width"], json!(20));
    assert_eq!(trace["line"]["color"][2], json!("#F1C40F"));
    assert_eq!(panels[0]["figure"]["layout"]["height"], json!(400));
    assert_eq!(panels[0]["figure"]["layout"]["yaxis"]["title"], json!("朝代"));
}

#[test]
fn event_markers_scale_with_importance_and_use_category_colors() {
    let dataset = sample_dataset();
    let state = FilterState::default().with_range(YearRange::new(-300, 200));
    let panels = render_json(&dataset, &state, Locale::Chinese);
    let event_panel = &panels[1];
    let trace = &event_panel["figure"]["data"][0];

    assert_eq!(trace["mode"], json!("markers"));
    assert_eq!(trace["x"], json!([-221, -209, 105]));
    assert_eq!(trace["marker"]["size"], json!([25, 15, 20]));
    assert_eq!(
        trace["marker"]["color"],
        json!(["#3498DB", "#E74C3C", "#9B59B6"])
    );
    assert_eq!(trace["marker"]["opacity"], json!(0.8));
    assert_eq!(trace["customdata"], json!(["event_0", "event_1", "event_2"]));
    assert_eq!(
        trace["text"][0],
        json!("<b>秦统一六国</b><br>秦王嬴政统一中国<br>朝代: 秦<br>重要性: 5<br>分类: 政治")
    );
    assert_eq!(event_panel["figure"]["layout"]["margin"]["l"], json!(150));
    assert_eq!(event_panel["figure"]["layout"]["xaxis"]["range"], json!([-300, 200]));
}

#[test]
fn figure_lines_use_dynasty_palette_and_formatted_lifespan() {
    let dataset = sample_dataset();
    let panels = render_json(&dataset, &FilterState::default(), Locale::English);
    let trace = &panels[2]["figure"]["data"][0];

    assert_eq!(trace["line"]["width"], json!(10));
    assert_eq!(trace["line"]["color"][0], json!("#2C3E50"));
    // 宋 không có trong danh sách triều đại.
    assert_eq!(trace["line"]["color"][4], json!(FALLBACK_COLOR));
    assert_eq!(
        trace["text"][1],
        json!("<b>司马迁</b><br>史记作者<br>Dynasty: 汉<br>Lifespan: BCE 145 - BCE 86<br>Importance: 4")
    );
    assert_eq!(panels[2]["figure"]["layout"]["yaxis"]["title"], json!("Figures"));
}

#[test]
fn empty_filter_result_still_renders_empty_traces() {
    let dataset = sample_dataset();
    let state = FilterState::default().with_search("不存在的关键词");
    let panels = render_json(&dataset, &state, Locale::Chinese);

    for panel in panels.as_array().unwrap() {
        assert_eq!(panel["figure"]["data"][0]["x"], json!([]));
    }
}

#[test]
fn detail_cards_resolve_by_id_or_name() {
    let dataset = sample_dataset();

    let figure = detail_for(&dataset, PanelKind::Figure, "figure_2", Locale::Chinese)
        .expect("Không tìm thấy nhân vật");
    assert_eq!(figure.title, "李白 (701年 - 762年)");
    assert_eq!(figure.dynasty_line.as_deref(), Some("朝代: 唐"));
    assert_eq!(figure.image_url.as_deref(), Some("https://example.org/libai.png"));

    let event = detail_for(&dataset, PanelKind::Event, "安史之乱", Locale::English)
        .expect("Không tìm thấy sự kiện");
    assert_eq!(event.title, "安史之乱 (755 CE)");
    assert_eq!(event.image_url, None);

    let dynasty = detail_for(&dataset, PanelKind::Dynasty, "秦", Locale::English)
        .expect("Không tìm thấy triều đại");
    assert_eq!(dynasty.title, "秦 (BCE 221 - BCE 207)");

    assert!(detail_for(&dataset, PanelKind::Event, "event_99", Locale::Chinese).is_none());
}

#[test]
fn extreme_importance_values_keep_marker_sizes_in_range() {
    let event = |name: &str, importance: i32| Event {
        id: None,
        year: 1000,
        name: name.into(),
        description: String::new(),
        dynasty: "宋".into(),
        category: "文化".into(),
        importance,
        image_url: None,
    };
    let events = [
        event("过大", i32::MAX),
        event("负数", -3),
        event("过小", i32::MIN),
    ];
    let refs: Vec<&Event> = events.iter().collect();

    let chart = render_event_panel(&refs, &FilterState::default(), Locale::English);
    let marker = chart.figure.data[0]
        .marker
        .as_ref()
        .expect("Event trace must carry markers");

    assert_eq!(marker.size, vec![i32::MAX, 0, 0]);
    assert_eq!(chart.figure.data[0].customdata, vec!["过大", "负数", "过小"]);
}
