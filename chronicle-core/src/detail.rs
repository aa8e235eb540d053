//! Thẻ chi tiết hiển thị khi click vào một điểm trên biểu đồ.

use serde::Serialize;

use crate::{Dataset, Locale, PanelKind};

/// Nội dung bảng chi tiết khi người dùng click vào một bản ghi.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DetailCard {
    pub panel: PanelKind,
    pub title: String,
    pub description: String,
    pub dynasty_line: Option<String>,
    pub image_url: Option<String>,
}

/// Tra bản ghi theo khóa trong `customdata` của trace; `None` nếu không thấy.
pub fn detail_for(
    dataset: &Dataset,
    panel: PanelKind,
    key: &str,
    locale: Locale,
) -> Option<DetailCard> {
    let labels = locale.labels();

    match panel {
        PanelKind::Dynasty => dataset.find_dynasty(key).map(|dynasty| DetailCard {
            panel,
            title: format!(
                "{} ({} - {})",
                dynasty.name,
                locale.format_year(dynasty.start_year),
                locale.format_year(dynasty.end_year)
            ),
            description: dynasty.description.clone(),
            dynasty_line: None,
            image_url: None,
        }),
        PanelKind::Event => dataset.find_event(key).map(|event| DetailCard {
            panel,
            title: format!("{} ({})", event.name, locale.format_year(event.year)),
            description: event.description.clone(),
            dynasty_line: Some(format!("{}: {}", labels.dynasty_field, event.dynasty)),
            image_url: event.image_url.clone(),
        }),
        PanelKind::Figure => dataset.find_figure(key).map(|figure| DetailCard {
            panel,
            title: format!(
                "{} ({} - {})",
                figure.name,
                locale.format_year(figure.birth_year),
                locale.format_year(figure.death_year)
            ),
            description: figure.description.clone(),
            dynasty_line: Some(format!("{}: {}", labels.dynasty_field, figure.dynasty)),
            image_url: figure.image_url.clone(),
        }),
    }
}
