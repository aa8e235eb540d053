//! CSV preprocessing: three source tables into one timeline dataset.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::Utc;
use chronicle_core::{Dataset, Dynasty, Event, EventCategory, Figure, TimelineError};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const DYNASTIES_FILE: &str = "dynasties.csv";
pub const EVENTS_FILE: &str = "events.csv";
pub const FIGURES_FILE: &str = "figures.csv";

/// Keyword groups checked in order; the first group with a hit wins.
const CATEGORY_KEYWORDS: [(EventCategory, &[&str]); 5] = [
    (
        EventCategory::Military,
        &["战争", "战役", "起义", "军队", "将军", "攻打", "征服", "入侵"],
    ),
    (
        EventCategory::Politics,
        &["皇帝", "政权", "改革", "制度", "法律", "朝廷", "官员", "宰相"],
    ),
    (
        EventCategory::Culture,
        &["文学", "艺术", "哲学", "思想", "宗教", "教育", "文化", "诗人"],
    ),
    (
        EventCategory::Economy,
        &["经济", "商业", "贸易", "农业", "税收", "货币", "财政"],
    ),
    (
        EventCategory::Technology,
        &["发明", "科技", "技术", "天文", "医学", "工程", "建筑"],
    ),
];

#[derive(Debug, Deserialize)]
struct DynastyRow {
    dynasty: String,
    start_year: i32,
    end_year: i32,
    #[serde(default)]
    description: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    importance: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct EventRow {
    year: i32,
    event: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    dynasty: String,
    #[serde(default)]
    importance: i32,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FigureRow {
    name: String,
    birth_year: i32,
    death_year: i32,
    #[serde(default)]
    dynasty: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    importance: i32,
    #[serde(default)]
    image_url: Option<String>,
}

/// Guess an event category from keywords in its title and description.
pub fn infer_category(title: &str, description: &str) -> EventCategory {
    let text = format!("{} {}", title.to_lowercase(), description.to_lowercase());

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|word| text.contains(word)))
        .map(|(category, _)| *category)
        .unwrap_or(EventCategory::Other)
}

/// Build a dataset from `dynasties.csv`, `events.csv` and `figures.csv` in `dir`.
pub fn build_dataset_from_csv_dir(dir: &Path) -> Result<Dataset, TimelineError> {
    let open = |name: &str| {
        let path = dir.join(name);
        File::open(&path).map_err(|err| TimelineError::Io(format!("{}: {err}", path.display())))
    };

    build_dataset_from_readers(open(DYNASTIES_FILE)?, open(EVENTS_FILE)?, open(FIGURES_FILE)?)
}

/// Build a dataset from three CSV sources with header rows.
///
/// Events and figures get positional ids (`event_0`, `figure_0`, ...), dynasties
/// get their duration, events without a category are classified by keyword,
/// and the overall year bounds are computed.
pub fn build_dataset_from_readers<D, E, F>(
    dynasties: D,
    events: E,
    figures: F,
) -> Result<Dataset, TimelineError>
where
    D: Read,
    E: Read,
    F: Read,
{
    let dynasties: Vec<Dynasty> = read_rows::<DynastyRow, _>(dynasties, DYNASTIES_FILE)?
        .into_iter()
        .map(convert_dynasty)
        .collect();

    let mut inferred = 0usize;
    let events: Vec<Event> = read_rows::<EventRow, _>(events, EVENTS_FILE)?
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let (event, was_inferred) = convert_event(index, row);
            inferred += usize::from(was_inferred);
            event
        })
        .collect();

    let figures: Vec<Figure> = read_rows::<FigureRow, _>(figures, FIGURES_FILE)?
        .into_iter()
        .enumerate()
        .map(|(index, row)| convert_figure(index, row))
        .collect();

    if inferred > 0 {
        tracing::debug!(inferred, "Inferred event categories from keywords");
    }

    let mut dataset = Dataset {
        dynasties,
        events,
        figures,
        time_range: None,
        generated_at: Some(Utc::now()),
    };
    dataset.time_range = dataset.year_bounds();

    tracing::info!(
        dynasties = dataset.dynasties.len(),
        events = dataset.events.len(),
        figures = dataset.figures.len(),
        "Built timeline dataset from CSV"
    );

    Ok(dataset)
}

fn read_rows<T, R>(source: R, label: &str) -> Result<Vec<T>, TimelineError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    reader
        .deserialize::<T>()
        .enumerate()
        .map(|(index, row)| {
            row.map_err(|err| TimelineError::Parse(format!("{label} row {}: {err}", index + 1)))
        })
        .collect()
}

fn convert_dynasty(row: DynastyRow) -> Dynasty {
    if row.start_year > row.end_year {
        tracing::warn!(dynasty = %row.dynasty, "Dynasty ends before it starts");
    }

    Dynasty {
        duration: Some(row.end_year - row.start_year),
        name: row.dynasty,
        start_year: row.start_year,
        end_year: row.end_year,
        description: row.description,
        color: non_empty(row.color).unwrap_or_else(|| chronicle_core::FALLBACK_COLOR.to_string()),
        importance: row.importance.unwrap_or_default(),
    }
}

fn convert_event(index: usize, row: EventRow) -> (Event, bool) {
    let (category, inferred) = match non_empty(row.category) {
        Some(category) => (category, false),
        None => (
            infer_category(&row.event, &row.description)
                .label()
                .to_string(),
            true,
        ),
    };

    let event = Event {
        id: Some(format!("event_{index}")),
        year: row.year,
        name: row.event,
        description: row.description,
        dynasty: row.dynasty,
        category,
        importance: row.importance,
        image_url: non_empty(row.image_url),
    };
    (event, inferred)
}

fn convert_figure(index: usize, row: FigureRow) -> Figure {
    if row.birth_year > row.death_year {
        tracing::warn!(figure = %row.name, "Figure dies before birth");
    }

    Figure {
        id: Some(format!("figure_{index}")),
        name: row.name,
        birth_year: row.birth_year,
        death_year: row.death_year,
        description: row.description,
        dynasty: row.dynasty,
        importance: row.importance,
        image_url: non_empty(row.image_url),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn military_keywords_take_priority() {
        assert_eq!(
            infer_category("皇帝亲征", "大规模战争"),
            EventCategory::Military
        );
        assert_eq!(infer_category("王安石变法", "推行改革"), EventCategory::Politics);
        assert_eq!(infer_category("李白", "著名诗人"), EventCategory::Culture);
        assert_eq!(infer_category("开通丝路", "贸易往来"), EventCategory::Economy);
        assert_eq!(infer_category("活字印刷", "毕昇发明"), EventCategory::Technology);
        assert_eq!(infer_category("无名", "无记载"), EventCategory::Other);
    }
}
