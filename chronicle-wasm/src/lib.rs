//! Bridge WASM <-> JavaScript trung lập framework cho bộ lọc niên biểu.

use chronicle_core::{
    detail_for, render_panels, CategoryFilter, Dataset, DynastyImportance, FilterState, Locale,
    PanelKind, TimelineError, YearRange,
};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

/// Bộ lọc phía JS: trường nào vắng thì giữ giá trị mặc định.
#[derive(Deserialize)]
struct JsFilterState {
    #[serde(default)]
    range: Option<[i32; 2]>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    min_importance: Option<i32>,
    #[serde(default)]
    present_year: Option<i32>,
    #[serde(default)]
    dynasty_importance: Option<DynastyImportance>,
}

impl From<JsFilterState> for FilterState {
    fn from(cfg: JsFilterState) -> Self {
        let mut state = FilterState::default();
        if let Some([lower, upper]) = cfg.range {
            state = state.with_range(YearRange::new(lower, upper));
        }
        if let Some(search) = cfg.search {
            state = state.with_search(search);
        }
        if let Some(category) = cfg.category {
            state = state.with_category(CategoryFilter::from(category));
        }
        if let Some(min_importance) = cfg.min_importance {
            state = state.with_min_importance(min_importance);
        }
        if let Some(present_year) = cfg.present_year {
            state.present_year = present_year;
        }
        if let Some(policy) = cfg.dynasty_importance {
            state = state.with_dynasty_importance(policy);
        }
        state
    }
}

/// Lọc ba tập bản ghi, trả về `{ dynasties, events, figures }`.
#[wasm_bindgen]
pub fn filter_timeline(dataset: JsValue, filter: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let dataset = read_dataset(dataset)?;
    let state = read_filter(filter)?;

    to_value(&dataset.filter(&state))
        .map_err(|err| JsValue::from_str(&format!("Không serialize kết quả lọc: {err}")))
}

/// Dựng tham số Plotly cho cả ba bảng theo bộ lọc hiện tại.
#[wasm_bindgen]
pub fn render_timeline(
    dataset: JsValue,
    filter: Option<JsValue>,
    locale: Option<String>,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let dataset = read_dataset(dataset)?;
    let state = read_filter(filter)?;
    let locale = parse_locale(locale.as_deref());
    let palette = dataset.palette();

    let panels = render_panels(&dataset.filter(&state), &state, &palette, locale);
    to_value(&panels).map_err(|err| JsValue::from_str(&format!("Không serialize biểu đồ: {err}")))
}

/// Thẻ chi tiết của một bản ghi; `null` khi không tìm thấy.
#[wasm_bindgen]
pub fn describe_record(
    dataset: JsValue,
    panel: &str,
    key: &str,
    locale: Option<String>,
) -> Result<JsValue, JsValue> {
    let dataset = read_dataset(dataset)?;
    let panel = parse_panel(panel)
        .ok_or_else(|| JsValue::from_str(&format!("Bảng không hợp lệ: {panel}")))?;
    let card = detail_for(&dataset, panel, key, parse_locale(locale.as_deref()));

    to_value(&card).map_err(|err| JsValue::from_str(&format!("Không serialize thẻ chi tiết: {err}")))
}

/// Định dạng năm; mặc định nhãn tiếng Anh ("BCE 221", "1368 CE").
#[wasm_bindgen]
pub fn format_year(year: i32, locale: Option<String>) -> String {
    parse_locale(locale.as_deref()).format_year(year)
}

fn read_dataset(dataset: JsValue) -> Result<Dataset, JsValue> {
    let value = from_value::<serde_json::Value>(dataset)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON dữ liệu: {err}")))?;

    chronicle_dataset::load_dataset_value(&value)
        .map_err(|err| JsValue::from_str(&format_timeline_error(err)))
}

fn read_filter(filter: Option<JsValue>) -> Result<FilterState, JsValue> {
    match filter {
        Some(js_filter) if !js_filter.is_undefined() && !js_filter.is_null() => {
            let cfg: JsFilterState = from_value(js_filter)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được bộ lọc: {err}")))?;
            Ok(FilterState::from(cfg))
        }
        _ => Ok(FilterState::default()),
    }
}

fn parse_locale(locale: Option<&str>) -> Locale {
    match locale {
        Some("zh") | Some("zh-CN") | Some("chinese") => Locale::Chinese,
        _ => Locale::English,
    }
}

fn parse_panel(panel: &str) -> Option<PanelKind> {
    PanelKind::ALL
        .into_iter()
        .find(|kind| kind.mount_id() == panel || panel_name(*kind) == panel)
}

fn panel_name(panel: PanelKind) -> &'static str {
    match panel {
        PanelKind::Dynasty => "dynasty",
        PanelKind::Event => "event",
        PanelKind::Figure => "figure",
    }
}

fn format_timeline_error(err: TimelineError) -> String {
    format!("Timeline error: {err}")
}
