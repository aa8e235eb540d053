//! Bộ lọc thuần: nhận tập bản ghi và trạng thái bộ lọc, trả về tập con theo thứ tự gốc.

use serde::{Deserialize, Serialize};

use crate::{Dynasty, Event, Figure, TimelineConfig, YearRange, EARLIEST_YEAR, PRESENT_YEAR};

/// Chính sách áp ngưỡng quan trọng cho triều đại.
///
/// Sự kiện và nhân vật luôn bị lọc theo ngưỡng; triều đại mặc định được miễn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DynastyImportance {
    #[default]
    Exempt,
    Filtered,
}

/// Lựa chọn trong ô lọc phân loại sự kiện.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(expected) => expected == category,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        match value {
            "" | "all" => CategoryFilter::All,
            other => CategoryFilter::Only(other.to_string()),
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        CategoryFilter::from(value.as_str())
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::All => "all".to_string(),
            CategoryFilter::Only(label) => label,
        }
    }
}

/// Bốn tham số lọc đang hoạt động, cùng năm chặn và chính sách triều đại.
///
/// Giá trị bất biến: mỗi thao tác trên giao diện dựng một `FilterState` mới
/// bằng các hàm `with_*` thay vì sửa tại chỗ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilterState {
    pub range: YearRange,
    pub search: String,
    pub category: CategoryFilter,
    pub min_importance: i32,
    pub present_year: i32,
    pub dynasty_importance: DynastyImportance,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            range: YearRange::new(EARLIEST_YEAR, PRESENT_YEAR),
            search: String::new(),
            category: CategoryFilter::All,
            min_importance: 1,
            present_year: PRESENT_YEAR,
            dynasty_importance: DynastyImportance::Exempt,
        }
    }
}

impl FilterState {
    /// Trạng thái ban đầu theo cấu hình: toàn bộ khoảng năm, không từ khóa.
    pub fn from_config(config: &TimelineConfig) -> Self {
        Self {
            range: config.full_range,
            present_year: config.present_year,
            dynasty_importance: config.dynasty_importance,
            ..Self::default()
        }
    }

    pub fn with_range(self, range: YearRange) -> Self {
        Self { range, ..self }
    }

    /// Từ khóa được cắt khoảng trắng hai đầu trước khi lưu.
    pub fn with_search(self, search: impl AsRef<str>) -> Self {
        Self {
            search: search.as_ref().trim().to_string(),
            ..self
        }
    }

    pub fn with_category(self, category: impl Into<CategoryFilter>) -> Self {
        Self {
            category: category.into(),
            ..self
        }
    }

    pub fn with_min_importance(self, min_importance: i32) -> Self {
        Self {
            min_importance,
            ..self
        }
    }

    pub fn with_dynasty_importance(self, dynasty_importance: DynastyImportance) -> Self {
        Self {
            dynasty_importance,
            ..self
        }
    }

    /// Từ khóa đã chuẩn hóa chữ thường, `None` khi rỗng.
    fn needle(&self) -> Option<String> {
        let trimmed = self.search.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    }

    fn importance_applies(&self, kind: RecordKind) -> bool {
        match kind {
            RecordKind::Dynasty => self.dynasty_importance == DynastyImportance::Filtered,
            RecordKind::Event | RecordKind::Figure => true,
        }
    }

    fn admits<R: TimelineRecord>(&self, record: &R, needle: Option<&str>) -> bool {
        if !record.span().overlaps(self.range, self.present_year) {
            return false;
        }

        if let Some(needle) = needle {
            let hit = record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle));
            if !hit {
                return false;
            }
        }

        if let Some(category) = record.category() {
            if !self.category.matches(category) {
                return false;
            }
        }

        if self.importance_applies(R::KIND) && record.importance() < self.min_importance {
            return false;
        }

        true
    }
}

/// Loại bản ghi trong bộ dữ liệu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Dynasty,
    Event,
    Figure,
}

/// Vị trí của bản ghi trên trục thời gian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSpan {
    Point(i32),
    Interval { start: i32, end: i32 },
}

impl YearSpan {
    /// Khoảng giao nhau bao gồm cả hai đầu; đầu cuối khoảng bị chặn bởi `present_year`.
    pub fn overlaps(self, range: YearRange, present_year: i32) -> bool {
        match self {
            YearSpan::Point(year) => range.contains(year),
            YearSpan::Interval { start, end } => {
                start <= range.upper && end.min(present_year) >= range.lower
            }
        }
    }
}

/// Bản ghi có thể đi qua bộ lọc.
pub trait TimelineRecord {
    const KIND: RecordKind;

    fn span(&self) -> YearSpan;

    /// Các trường văn bản được so khớp với từ khóa.
    fn search_fields(&self) -> Vec<&str>;

    fn importance(&self) -> i32;

    /// Chỉ sự kiện có phân loại.
    fn category(&self) -> Option<&str> {
        None
    }
}

impl TimelineRecord for Dynasty {
    const KIND: RecordKind = RecordKind::Dynasty;

    fn span(&self) -> YearSpan {
        YearSpan::Interval {
            start: self.start_year,
            end: self.end_year,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }

    fn importance(&self) -> i32 {
        self.importance
    }
}

impl TimelineRecord for Event {
    const KIND: RecordKind = RecordKind::Event;

    fn span(&self) -> YearSpan {
        YearSpan::Point(self.year)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.description.as_str(),
            self.dynasty.as_str(),
        ]
    }

    fn importance(&self) -> i32 {
        self.importance
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }
}

impl TimelineRecord for Figure {
    const KIND: RecordKind = RecordKind::Figure;

    fn span(&self) -> YearSpan {
        YearSpan::Interval {
            start: self.birth_year,
            end: self.death_year,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.description.as_str(),
            self.dynasty.as_str(),
        ]
    }

    fn importance(&self) -> i32 {
        self.importance
    }
}

fn filter_records<'a, R: TimelineRecord>(records: &'a [R], state: &FilterState) -> Vec<&'a R> {
    let needle = state.needle();
    records
        .iter()
        .filter(|record| state.admits(*record, needle.as_deref()))
        .collect()
}

pub fn filter_dynasties<'a>(dynasties: &'a [Dynasty], state: &FilterState) -> Vec<&'a Dynasty> {
    filter_records(dynasties, state)
}

pub fn filter_events<'a>(events: &'a [Event], state: &FilterState) -> Vec<&'a Event> {
    filter_records(events, state)
}

pub fn filter_figures<'a>(figures: &'a [Figure], state: &FilterState) -> Vec<&'a Figure> {
    filter_records(figures, state)
}

/// Kết quả lọc của ba bảng, mượn bản ghi từ bộ dữ liệu gốc.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct FilteredTimeline<'a> {
    pub dynasties: Vec<&'a Dynasty>,
    pub events: Vec<&'a Event>,
    pub figures: Vec<&'a Figure>,
}

impl FilteredTimeline<'_> {
    pub fn is_empty(&self) -> bool {
        self.dynasties.is_empty() && self.events.is_empty() && self.figures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dynasties.len() + self.events.len() + self.figures.len()
    }
}
