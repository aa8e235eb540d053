//! Dựng tham số biểu đồ (trace + layout theo schema Plotly) cho ba bảng niên biểu.

use serde::{Deserialize, Serialize};

use crate::{
    category_color, Dynasty, DynastyPalette, Event, Figure, FilterState, FilteredTimeline, Locale,
};

/// Ba bảng niên biểu, mỗi bảng gắn với một điểm mount cố định.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    Dynasty,
    Event,
    Figure,
}

impl PanelKind {
    pub const ALL: [PanelKind; 3] = [PanelKind::Dynasty, PanelKind::Event, PanelKind::Figure];

    /// Id phần tử DOM bị thay thế toàn bộ mỗi lần vẽ lại.
    pub fn mount_id(self) -> &'static str {
        match self {
            PanelKind::Dynasty => "dynasty-timeline",
            PanelKind::Event => "event-timeline",
            PanelKind::Figure => "figure-timeline",
        }
    }

    fn height(self) -> u32 {
        match self {
            PanelKind::Dynasty => 400,
            PanelKind::Event | PanelKind::Figure => 500,
        }
    }

    fn left_margin(self) -> u32 {
        match self {
            PanelKind::Event => 150,
            PanelKind::Dynasty | PanelKind::Figure => 100,
        }
    }
}

/// Giá trị trục x: một năm hoặc một cặp năm đầu/cuối.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AxisValue {
    Year(i32),
    Span([i32; 2]),
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    Lines,
    Markers,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineStyle {
    pub width: u32,
    pub color: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarkerStyle {
    pub size: Vec<i32>,
    pub color: Vec<String>,
    pub opacity: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FontSpec {
    pub size: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HoverLabel {
    pub bgcolor: String,
    pub bordercolor: String,
    pub font: FontSpec,
}

impl Default for HoverLabel {
    fn default() -> Self {
        Self {
            bgcolor: "#FFF".to_string(),
            bordercolor: "#333".to_string(),
            font: FontSpec { size: 14 },
        }
    }
}

/// Một trace scatter của Plotly.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Trace {
    pub x: Vec<AxisValue>,
    pub y: Vec<String>,
    pub text: Vec<String>,
    #[serde(rename = "type")]
    pub trace_type: String,
    pub mode: TraceMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerStyle>,
    pub hoverinfo: String,
    pub hoverlabel: HoverLabel,
    /// Khóa bản ghi (id, hoặc tên khi thiếu id) để mở thẻ chi tiết khi click.
    pub customdata: Vec<String>,
}

impl Trace {
    fn scatter(mode: TraceMode) -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            text: Vec::new(),
            trace_type: "scatter".to_string(),
            mode,
            line: None,
            marker: None,
            hoverinfo: "text".to_string(),
            hoverlabel: HoverLabel::default(),
            customdata: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AxisSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[i32; 2]>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickformat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automargin: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartLayout {
    pub height: u32,
    pub margin: Margin,
    pub xaxis: AxisSpec,
    pub yaxis: AxisSpec,
    pub hovermode: String,
}

/// Đầu vào của `Plotly.newPlot`: danh sách trace và layout.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartFigure {
    pub data: Vec<Trace>,
    pub layout: ChartLayout,
}

/// Biểu đồ của một bảng kèm id phần tử đích.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PanelChart {
    pub panel: PanelKind,
    pub target: String,
    pub figure: ChartFigure,
}

fn panel_layout(panel: PanelKind, state: &FilterState, locale: Locale) -> ChartLayout {
    let labels = locale.labels();
    let y_title = match panel {
        PanelKind::Dynasty => labels.dynasty_axis,
        PanelKind::Event => labels.event_axis,
        PanelKind::Figure => labels.figure_axis,
    };

    ChartLayout {
        height: panel.height(),
        margin: Margin {
            l: panel.left_margin(),
            r: 50,
            t: 30,
            b: 50,
        },
        xaxis: AxisSpec {
            range: Some(state.range.as_array()),
            title: labels.year_axis.to_string(),
            tickformat: Some(".0f".to_string()),
            automargin: None,
        },
        yaxis: AxisSpec {
            range: None,
            title: y_title.to_string(),
            tickformat: None,
            automargin: Some(true),
        },
        hovermode: "closest".to_string(),
    }
}

fn panel_chart(panel: PanelKind, trace: Trace, state: &FilterState, locale: Locale) -> PanelChart {
    PanelChart {
        panel,
        target: panel.mount_id().to_string(),
        figure: ChartFigure {
            data: vec![trace],
            layout: panel_layout(panel, state, locale),
        },
    }
}

/// Bảng triều đại: mỗi triều đại là một đoạn thẳng dày, tô theo màu riêng.
///
/// Trục x giữ nguyên `end_year` gốc; việc chặn theo năm hiện tại chỉ dùng khi lọc.
pub fn render_dynasty_panel(
    dynasties: &[&Dynasty],
    state: &FilterState,
    locale: Locale,
) -> PanelChart {
    let mut trace = Trace::scatter(TraceMode::Lines);
    let mut colors = Vec::with_capacity(dynasties.len());

    for dynasty in dynasties {
        trace
            .x
            .push(AxisValue::Span([dynasty.start_year, dynasty.end_year]));
        trace.y.push(dynasty.name.clone());
        trace.text.push(dynasty.description.clone());
        trace.customdata.push(dynasty.name.clone());
        colors.push(dynasty.color.clone());
    }

    trace.line = Some(LineStyle {
        width: 20,
        color: colors,
    });

    panel_chart(PanelKind::Dynasty, trace, state, locale)
}

/// Bảng sự kiện: điểm đánh dấu có kích thước tỉ lệ mức quan trọng, màu theo phân loại.
pub fn render_event_panel(events: &[&Event], state: &FilterState, locale: Locale) -> PanelChart {
    let labels = locale.labels();
    let mut trace = Trace::scatter(TraceMode::Markers);
    let mut sizes = Vec::with_capacity(events.len());
    let mut colors = Vec::with_capacity(events.len());

    for event in events {
        trace.x.push(AxisValue::Year(event.year));
        trace.y.push(event.name.clone());
        trace.text.push(format!(
            "<b>{}</b><br>{}<br>{}: {}<br>{}: {}<br>{}: {}",
            event.name,
            event.description,
            labels.dynasty_field,
            event.dynasty,
            labels.importance_field,
            event.importance,
            labels.category_field,
            event.category,
        ));
        trace
            .customdata
            .push(event.id.clone().unwrap_or_else(|| event.name.clone()));
        sizes.push(marker_size(event.importance));
        colors.push(category_color(&event.category).to_string());
    }

    trace.marker = Some(MarkerStyle {
        size: sizes,
        color: colors,
        opacity: 0.8,
    });

    panel_chart(PanelKind::Event, trace, state, locale)
}

/// Kích thước điểm tỉ lệ với mức quan trọng; dữ liệu lệch không làm tràn số.
fn marker_size(importance: i32) -> i32 {
    importance.saturating_mul(5).max(0)
}

/// Bảng nhân vật: đường đời sinh-mất, tô theo màu triều đại của nhân vật.
pub fn render_figure_panel(
    figures: &[&Figure],
    state: &FilterState,
    palette: &DynastyPalette,
    locale: Locale,
) -> PanelChart {
    let labels = locale.labels();
    let mut trace = Trace::scatter(TraceMode::Lines);
    let mut colors = Vec::with_capacity(figures.len());

    for figure in figures {
        trace
            .x
            .push(AxisValue::Span([figure.birth_year, figure.death_year]));
        trace.y.push(figure.name.clone());
        trace.text.push(format!(
            "<b>{}</b><br>{}<br>{}: {}<br>{}: {} - {}<br>{}: {}",
            figure.name,
            figure.description,
            labels.dynasty_field,
            figure.dynasty,
            labels.lifespan_field,
            locale.format_year(figure.birth_year),
            locale.format_year(figure.death_year),
            labels.importance_field,
            figure.importance,
        ));
        trace
            .customdata
            .push(figure.id.clone().unwrap_or_else(|| figure.name.clone()));
        colors.push(palette.color_for(&figure.dynasty).to_string());
    }

    trace.line = Some(LineStyle {
        width: 10,
        color: colors,
    });

    panel_chart(PanelKind::Figure, trace, state, locale)
}

/// Dựng lại cả ba bảng; gọi lại sau mỗi lần `FilterState` thay đổi.
pub fn render_panels(
    filtered: &FilteredTimeline<'_>,
    state: &FilterState,
    palette: &DynastyPalette,
    locale: Locale,
) -> Vec<PanelChart> {
    vec![
        render_dynasty_panel(&filtered.dynasties, state, locale),
        render_event_panel(&filtered.events, state, locale),
        render_figure_panel(&filtered.figures, state, palette, locale),
    ]
}
