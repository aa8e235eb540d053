use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chronicle_core::{render_panels, FilterState, FilteredTimeline, Locale, TimelineConfig, YearRange};
use chronicle_dataset::{build_dataset_from_csv_dir, load_dataset_path, write_dataset, DATASET_FILE};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "chronicle-cli",
    about = "Dựng và lọc dữ liệu niên biểu lịch sử Trung Quốc."
)]
struct Cli {
    /// File cấu hình TOML (năm hiện tại, khoảng năm, ngôn ngữ).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Gộp dynasties.csv, events.csv, figures.csv thành file JSON.
    Build {
        /// Thư mục chứa ba file CSV.
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,
        /// File JSON đầu ra (mặc định: <data_dir>/timeline_data.json).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Lọc bộ dữ liệu và in kết quả hoặc tham số biểu đồ.
    Filter {
        /// Đường dẫn tới file JSON dữ liệu.
        #[arg(short, long)]
        input: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
        /// In JSON tham số Plotly của ba bảng thay vì danh sách tên.
        #[arg(long)]
        charts: bool,
        #[arg(long, value_enum)]
        locale: Option<LocaleArg>,
    },
    /// Định dạng một năm (năm âm là trước Công nguyên).
    Year {
        #[arg(allow_hyphen_values = true)]
        year: i32,
        #[arg(long, value_enum)]
        locale: Option<LocaleArg>,
    },
}

#[derive(clap::Args, Debug, Default)]
struct FilterArgs {
    /// Năm bắt đầu.
    #[arg(long, allow_hyphen_values = true)]
    from: Option<i32>,
    /// Năm kết thúc.
    #[arg(long, allow_hyphen_values = true)]
    to: Option<i32>,
    /// Từ khóa, không phân biệt hoa thường.
    #[arg(short, long)]
    search: Option<String>,
    /// Phân loại sự kiện, hoặc "all".
    #[arg(long)]
    category: Option<String>,
    /// Ngưỡng quan trọng tối thiểu.
    #[arg(long)]
    min_importance: Option<i32>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LocaleArg {
    En,
    Zh,
}

impl From<LocaleArg> for Locale {
    fn from(arg: LocaleArg) -> Self {
        match arg {
            LocaleArg::En => Locale::English,
            LocaleArg::Zh => Locale::Chinese,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Build { data_dir, output } => run_build(&data_dir, output),
        Command::Filter {
            input,
            filter,
            charts,
            locale,
        } => {
            let locale = locale.map(Locale::from).unwrap_or(config.locale);
            run_filter(&input, &config, &filter, charts, locale)
        }
        Command::Year { year, locale } => {
            let locale = locale.map(Locale::from).unwrap_or(config.locale);
            println!("{}", locale.format_year(year));
            Ok(())
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TimelineConfig> {
    let Some(path) = path else {
        return Ok(TimelineConfig::default());
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Không đọc được file cấu hình {:?}", path))?;
    let config: TimelineConfig = toml::from_str(&raw)
        .with_context(|| format!("File cấu hình không hợp lệ {:?}", path))?;
    tracing::debug!(?config, "Loaded config");
    Ok(config)
}

fn run_build(data_dir: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    let dataset = build_dataset_from_csv_dir(data_dir)
        .with_context(|| format!("Không dựng được dữ liệu từ {:?}", data_dir))?;
    let output = output.unwrap_or_else(|| data_dir.join(DATASET_FILE));
    write_dataset(&dataset, &output)?;

    println!(
        "Dynasties: {}\nEvents: {}\nFigures: {}\nOutput: {}",
        dataset.dynasties.len(),
        dataset.events.len(),
        dataset.figures.len(),
        output.display()
    );
    Ok(())
}

fn run_filter(
    input: &Path,
    config: &TimelineConfig,
    args: &FilterArgs,
    charts: bool,
    locale: Locale,
) -> anyhow::Result<()> {
    let dataset = load_dataset_path(input)
        .with_context(|| format!("Không đọc được file {:?}", input))?;
    let state = filter_state(config, args);
    tracing::debug!(?state, "Applying filter");

    let filtered = dataset.filter(&state);

    if charts {
        let palette = dataset.palette();
        let panels = render_panels(&filtered, &state, &palette, locale);
        println!("{}", serde_json::to_string_pretty(&panels)?);
    } else {
        print_summary(&filtered, &state, locale);
    }

    Ok(())
}

fn filter_state(config: &TimelineConfig, args: &FilterArgs) -> FilterState {
    let mut state = FilterState::from_config(config);

    if args.from.is_some() || args.to.is_some() {
        let lower = args.from.unwrap_or(state.range.lower);
        let upper = args.to.unwrap_or(state.range.upper);
        state = state.with_range(YearRange::new(lower, upper));
    }
    if let Some(search) = &args.search {
        state = state.with_search(search);
    }
    if let Some(category) = &args.category {
        state = state.with_category(category.as_str());
    }
    if let Some(level) = args.min_importance {
        state = state.with_min_importance(level);
    }
    state
}

fn print_summary(filtered: &FilteredTimeline<'_>, state: &FilterState, locale: Locale) {
    let labels = locale.labels();

    println!(
        "{}: {} - {}",
        labels.range_field,
        locale.format_year(state.range.lower),
        locale.format_year(state.range.upper)
    );

    let dynasties: Vec<&str> = filtered.dynasties.iter().map(|d| d.name.as_str()).collect();
    let events: Vec<&str> = filtered.events.iter().map(|e| e.name.as_str()).collect();
    let figures: Vec<&str> = filtered.figures.iter().map(|f| f.name.as_str()).collect();

    for (label, names) in [
        (labels.dynasty_axis, dynasties),
        (labels.event_axis, events),
        (labels.figure_axis, figures),
    ] {
        println!("{label} ({}): {}", names.len(), names.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::CategoryFilter;

    #[test]
    fn open_ended_range_keeps_configured_bound() {
        let args = FilterArgs {
            from: Some(-221),
            ..FilterArgs::default()
        };
        let state = filter_state(&TimelineConfig::default(), &args);

        assert_eq!(state.range, YearRange::new(-221, 2025));
        assert_eq!(state.category, CategoryFilter::All);
        assert_eq!(state.min_importance, 1);
    }

    #[test]
    fn cli_accepts_negative_years() {
        let cli = Cli::try_parse_from([
            "chronicle-cli",
            "filter",
            "--input",
            "timeline_data.json",
            "--from",
            "-206",
            "--to",
            "220",
            "--category",
            "军事",
        ])
        .expect("Không parse được tham số");

        let Command::Filter { filter, .. } = cli.command else {
            panic!("Sai subcommand");
        };
        let state = filter_state(&TimelineConfig::default(), &filter);
        assert_eq!(state.range, YearRange::new(-206, 220));
        assert_eq!(state.category, CategoryFilter::Only("军事".into()));
    }

    #[test]
    fn bundled_config_parses() {
        let raw = include_str!("../chronicle.toml");
        let config: TimelineConfig = toml::from_str(raw).expect("Cấu hình mẫu không hợp lệ");
        assert_eq!(config, TimelineConfig::default());
    }
}
