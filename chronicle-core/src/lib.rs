//! Logic lõi lọc và trình bày niên biểu lịch sử Trung Quốc (triều đại, sự kiện, nhân vật).

mod chart;
mod detail;
mod filter;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

pub use chart::{
    render_dynasty_panel, render_event_panel, render_figure_panel, render_panels, AxisSpec,
    AxisValue, ChartFigure, ChartLayout, FontSpec, HoverLabel, LineStyle, Margin, MarkerStyle,
    PanelChart, PanelKind, Trace, TraceMode,
};
pub use detail::{detail_for, DetailCard};
pub use filter::{
    filter_dynasties, filter_events, filter_figures, CategoryFilter, DynastyImportance,
    FilterState, FilteredTimeline, RecordKind, TimelineRecord, YearSpan,
};

/// Năm "hiện tại" dùng để chặn trên các triều đại chưa kết thúc.
pub const PRESENT_YEAR: i32 = 2025;
/// Mốc sớm nhất của thanh trượt thời gian.
pub const EARLIEST_YEAR: i32 = -2100;
/// Màu xám mặc định khi không tra được màu.
pub const FALLBACK_COLOR: &str = "#95A5A6";

/// Cấu hình mặc định cho bộ lọc và phần trình bày.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimelineConfig {
    /// Năm chặn trên khi so khớp khoảng thời gian.
    pub present_year: i32,
    /// Toàn bộ khoảng năm mà thanh trượt cho phép.
    pub full_range: YearRange,
    /// Ngôn ngữ nhãn biểu đồ.
    pub locale: Locale,
    /// Triều đại có bị lọc theo mức quan trọng hay không.
    pub dynasty_importance: DynastyImportance,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            present_year: PRESENT_YEAR,
            full_range: YearRange::new(EARLIEST_YEAR, PRESENT_YEAR),
            locale: Locale::Chinese,
            dynasty_importance: DynastyImportance::Exempt,
        }
    }
}

/// Khoảng năm đóng `[lower, upper]`; năm âm là trước Công nguyên.
///
/// Trên dây (JSON) được biểu diễn dưới dạng mảng hai phần tử, giống giá trị
/// mà thanh trượt hai đầu phát ra.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct YearRange {
    pub lower: i32,
    pub upper: i32,
}

impl YearRange {
    /// Tạo khoảng năm, tự đảo hai đầu nếu bị ngược.
    pub fn new(lower: i32, upper: i32) -> Self {
        if lower <= upper {
            Self { lower, upper }
        } else {
            Self {
                lower: upper,
                upper: lower,
            }
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.lower <= year && year <= self.upper
    }

    pub fn as_array(&self) -> [i32; 2] {
        [self.lower, self.upper]
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::new(EARLIEST_YEAR, PRESENT_YEAR)
    }
}

impl From<[i32; 2]> for YearRange {
    fn from(pair: [i32; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<YearRange> for [i32; 2] {
    fn from(range: YearRange) -> Self {
        range.as_array()
    }
}

/// Ngôn ngữ hiển thị nhãn năm và nhãn biểu đồ.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    English,
    Chinese,
}

impl Locale {
    /// Định dạng năm theo ngôn ngữ: `-221` thành "BCE 221" hoặc "公元前221年".
    pub fn format_year(self, year: i32) -> String {
        match (self, year < 0) {
            (Locale::English, true) => format!("BCE {}", year.unsigned_abs()),
            (Locale::English, false) => format!("{year} CE"),
            (Locale::Chinese, true) => format!("公元前{}年", year.unsigned_abs()),
            (Locale::Chinese, false) => format!("{year}年"),
        }
    }

    /// Bộ nhãn trục và chú thích hover tương ứng.
    pub fn labels(self) -> &'static PanelLabels {
        match self {
            Locale::English => &ENGLISH_LABELS,
            Locale::Chinese => &CHINESE_LABELS,
        }
    }
}

/// Định dạng năm với nhãn tiếng Anh mặc định.
pub fn format_year(year: i32) -> String {
    Locale::English.format_year(year)
}

/// Nhãn văn bản dùng khi dựng biểu đồ và thẻ chi tiết.
#[derive(Debug, PartialEq, Eq)]
pub struct PanelLabels {
    pub year_axis: &'static str,
    pub dynasty_axis: &'static str,
    pub event_axis: &'static str,
    pub figure_axis: &'static str,
    pub dynasty_field: &'static str,
    pub importance_field: &'static str,
    pub category_field: &'static str,
    pub lifespan_field: &'static str,
    pub all_categories: &'static str,
    pub page_title: &'static str,
    pub page_subtitle: &'static str,
    pub search_field: &'static str,
    pub search_placeholder: &'static str,
    pub range_field: &'static str,
    pub display_field: &'static str,
    pub reset: &'static str,
    pub detail_prompt: &'static str,
}

static ENGLISH_LABELS: PanelLabels = PanelLabels {
    year_axis: "Year",
    dynasty_axis: "Dynasty",
    event_axis: "Events",
    figure_axis: "Figures",
    dynasty_field: "Dynasty",
    importance_field: "Importance",
    category_field: "Category",
    lifespan_field: "Lifespan",
    all_categories: "All",
    page_title: "Chinese History Timeline",
    page_subtitle: "Dynasties, events and figures through the ages",
    search_field: "Search",
    search_placeholder: "Search dynasties, events or figures",
    range_field: "Time range",
    display_field: "Panels",
    reset: "Reset",
    detail_prompt: "Click an event or figure on the timeline to see details",
};

static CHINESE_LABELS: PanelLabels = PanelLabels {
    year_axis: "年份",
    dynasty_axis: "朝代",
    event_axis: "历史事件",
    figure_axis: "历史人物",
    dynasty_field: "朝代",
    importance_field: "重要性",
    category_field: "分类",
    lifespan_field: "生卒年",
    all_categories: "全部",
    page_title: "中国历史年表",
    page_subtitle: "探索中华文明的时间长河",
    search_field: "搜索",
    search_placeholder: "输入关键词搜索朝代、事件或人物",
    range_field: "时间范围",
    display_field: "显示选项",
    reset: "重置",
    detail_prompt: "点击时间轴上的事件或人物查看详细信息",
};

/// Một triều đại trong bộ dữ liệu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dynasty {
    #[serde(rename = "dynasty", alias = "id")]
    pub name: String,
    pub start_year: i32,
    /// Có thể lớn hơn năm hiện tại; chỉ bị chặn khi so khớp.
    pub end_year: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default = "fallback_color")]
    pub color: String,
    #[serde(default, deserialize_with = "whole_number")]
    pub importance: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
}

/// Sự kiện lịch sử gắn với một năm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub year: i32,
    #[serde(rename = "event", alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dynasty: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "whole_number")]
    pub importance: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Nhân vật lịch sử với năm sinh, năm mất.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Figure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub birth_year: i32,
    pub death_year: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dynasty: String,
    #[serde(default, deserialize_with = "whole_number")]
    pub importance: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Biên năm nhỏ nhất/lớn nhất của toàn bộ dữ liệu.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearBounds {
    pub min_year: i32,
    pub max_year: i32,
}

/// Toàn bộ dữ liệu niên biểu, chỉ đọc sau khi nạp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Dataset {
    #[serde(default)]
    pub dynasties: Vec<Dynasty>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub figures: Vec<Figure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<YearBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl Dataset {
    /// Lọc cả ba tập bản ghi theo cùng một trạng thái bộ lọc.
    pub fn filter(&self, state: &FilterState) -> FilteredTimeline<'_> {
        FilteredTimeline {
            dynasties: filter_dynasties(&self.dynasties, state),
            events: filter_events(&self.events, state),
            figures: filter_figures(&self.figures, state),
        }
    }

    /// Bảng màu triều đại, dựng một lần sau khi nạp dữ liệu.
    pub fn palette(&self) -> DynastyPalette {
        DynastyPalette::from_dynasties(&self.dynasties)
    }

    /// Tính biên năm trên mọi mốc năm của ba tập bản ghi.
    pub fn year_bounds(&self) -> Option<YearBounds> {
        let years = self
            .dynasties
            .iter()
            .flat_map(|d| [d.start_year, d.end_year])
            .chain(self.events.iter().map(|e| e.year))
            .chain(
                self.figures
                    .iter()
                    .flat_map(|f| [f.birth_year, f.death_year]),
            );

        years.fold(None, |acc, year| match acc {
            None => Some(YearBounds {
                min_year: year,
                max_year: year,
            }),
            Some(bounds) => Some(YearBounds {
                min_year: bounds.min_year.min(year),
                max_year: bounds.max_year.max(year),
            }),
        })
    }

    /// Tìm sự kiện theo id, hoặc theo tên khi bản ghi không có id.
    pub fn find_event(&self, key: &str) -> Option<&Event> {
        self.events
            .iter()
            .find(|event| event.id.as_deref() == Some(key))
            .or_else(|| self.events.iter().find(|event| event.name == key))
    }

    pub fn find_figure(&self, key: &str) -> Option<&Figure> {
        self.figures
            .iter()
            .find(|figure| figure.id.as_deref() == Some(key))
            .or_else(|| self.figures.iter().find(|figure| figure.name == key))
    }

    pub fn find_dynasty(&self, name: &str) -> Option<&Dynasty> {
        self.dynasties.iter().find(|dynasty| dynasty.name == name)
    }
}

/// Nhóm phân loại sự kiện cố định.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventCategory {
    #[serde(rename = "政治")]
    Politics,
    #[serde(rename = "军事")]
    Military,
    #[serde(rename = "文化")]
    Culture,
    #[serde(rename = "经济")]
    Economy,
    #[serde(rename = "科技")]
    Technology,
    #[serde(rename = "其他")]
    Other,
}

impl EventCategory {
    /// Các nhóm có thể chọn trong ô lọc phân loại.
    pub const SELECTABLE: [EventCategory; 5] = [
        EventCategory::Politics,
        EventCategory::Military,
        EventCategory::Culture,
        EventCategory::Economy,
        EventCategory::Technology,
    ];

    /// Nhãn gốc được lưu trong dữ liệu.
    pub fn label(self) -> &'static str {
        match self {
            EventCategory::Politics => "政治",
            EventCategory::Military => "军事",
            EventCategory::Culture => "文化",
            EventCategory::Economy => "经济",
            EventCategory::Technology => "科技",
            EventCategory::Other => "其他",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "政治" => Some(EventCategory::Politics),
            "军事" => Some(EventCategory::Military),
            "文化" => Some(EventCategory::Culture),
            "经济" => Some(EventCategory::Economy),
            "科技" => Some(EventCategory::Technology),
            "其他" => Some(EventCategory::Other),
            _ => None,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            EventCategory::Politics => "#3498DB",
            EventCategory::Military => "#E74C3C",
            EventCategory::Culture => "#2ECC71",
            EventCategory::Economy => "#F39C12",
            EventCategory::Technology => "#9B59B6",
            EventCategory::Other => FALLBACK_COLOR,
        }
    }
}

/// Màu của một nhãn phân loại; nhãn lạ trả về màu xám.
pub fn category_color(label: &str) -> &'static str {
    EventCategory::from_label(label)
        .map(EventCategory::color)
        .unwrap_or(FALLBACK_COLOR)
}

/// Ánh xạ tên triều đại sang màu hiển thị.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynastyPalette {
    colors: HashMap<String, String>,
}

impl DynastyPalette {
    /// Trùng tên thì giữ màu của bản ghi xuất hiện trước.
    pub fn from_dynasties(dynasties: &[Dynasty]) -> Self {
        let mut colors = HashMap::with_capacity(dynasties.len());
        for dynasty in dynasties {
            colors
                .entry(dynasty.name.clone())
                .or_insert_with(|| dynasty.color.clone());
        }
        Self { colors }
    }

    pub fn color_for(&self, dynasty: &str) -> &str {
        self.colors
            .get(dynasty)
            .map(String::as_str)
            .unwrap_or(FALLBACK_COLOR)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Lỗi chung khi nạp hoặc dựng dữ liệu niên biểu.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("Dữ liệu đầu vào thiếu thông tin tối thiểu")]
    MissingData,
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Lỗi vào/ra: {0}")]
    Io(String),
    #[error("Lỗi khác: {0}")]
    Other(String),
}

fn fallback_color() -> String {
    FALLBACK_COLOR.to_string()
}

/// Nhận cả `4` lẫn `4.0`; số lẻ được làm tròn, số vượt `i32` bị từ chối.
fn whole_number<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    let value = match Number::deserialize(deserializer)? {
        Number::Int(value) => value,
        Number::Float(value) if value.is_finite() => value.round() as i64,
        Number::Float(value) => {
            return Err(de::Error::custom(format!("số không hợp lệ: {value}")));
        }
    };
    i32::try_from(value).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_years_in_both_locales() {
        assert_eq!(format_year(-221), "BCE 221");
        assert_eq!(format_year(1368), "1368 CE");
        assert_eq!(format_year(0), "0 CE");
        assert_eq!(Locale::Chinese.format_year(-221), "公元前221年");
        assert_eq!(Locale::Chinese.format_year(618), "618年");
    }

    #[test]
    fn unknown_category_falls_back_to_gray() {
        assert_eq!(category_color("军事"), "#E74C3C");
        assert_eq!(category_color("其他"), FALLBACK_COLOR);
        assert_eq!(category_color("宗教"), FALLBACK_COLOR);
    }

    #[test]
    fn year_range_swaps_inverted_bounds() {
        let range = YearRange::new(220, -206);
        assert_eq!(range.as_array(), [-206, 220]);
        assert!(range.contains(-206));
        assert!(range.contains(220));
        assert!(!range.contains(221));
    }

    #[test]
    fn palette_keeps_first_color_and_defaults_to_gray() {
        let dynasties = vec![
            Dynasty {
                name: "唐".into(),
                start_year: 618,
                end_year: 907,
                description: String::new(),
                color: "#FFD700".into(),
                importance: 5,
                duration: None,
            },
            Dynasty {
                name: "唐".into(),
                start_year: 923,
                end_year: 937,
                description: String::new(),
                color: "#000000".into(),
                importance: 1,
                duration: None,
            },
        ];
        let palette = DynastyPalette::from_dynasties(&dynasties);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.color_for("唐"), "#FFD700");
        assert_eq!(palette.color_for("宋"), FALLBACK_COLOR);
    }
}
