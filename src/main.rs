use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use econ_dashboard_lib::config::Settings;
use econ_dashboard_lib::fetcher::memory::MemorySource;
use econ_dashboard_lib::models::ChartView;
use econ_dashboard_lib::{load_from_settings, load_snapshot, telemetry};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch economic series and print the chart models as JSON", long_about = None)]
struct Cli {
    /// Series codes to add, in display order (defaults to ECONDATA_DEFAULT_SERIES)
    codes: Vec<String>,

    /// Start index into the shared timeline
    #[arg(long)]
    start: Option<usize>,

    /// Print a single chart instead of the whole dashboard
    #[arg(long, value_enum)]
    view: Option<ViewOpt>,

    /// Serve series from a saved /econdata response instead of the backend
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Override ECONDATA_BACKEND_URL
    #[arg(long)]
    backend_url: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ViewOpt {
    Level,
    Period,
    Yoy,
}

impl From<ViewOpt> for ChartView {
    fn from(opt: ViewOpt) -> Self {
        match opt {
            ViewOpt::Level => ChartView::Level,
            ViewOpt::Period => ChartView::PeriodChange,
            ViewOpt::Yoy => ChartView::YoYChange,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();

    let mut settings = Settings::from_env()?;
    if let Some(url) = cli.backend_url {
        settings.backend_url = url.trim_end_matches('/').to_string();
    }

    let snapshot = match &cli.fixture {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read fixture {}", path.display()))?;
            let json: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("Fixture {} is not valid JSON", path.display()))?;
            let codes: Vec<String> = if cli.codes.is_empty() {
                json.as_object().map(|m| m.keys().cloned().collect()).unwrap_or_default()
            } else {
                cli.codes.clone()
            };
            load_snapshot(Arc::new(MemorySource::from_response(&json)), &codes, cli.start).await
        }
        None => load_from_settings(&settings, &cli.codes, cli.start).await,
    };

    if let Some(error) = &snapshot.error {
        tracing::warn!("Error: {}", error);
    }

    let output = match cli.view {
        Some(view) => {
            let view = ChartView::from(view);
            let chart = snapshot.charts.iter().find(|c| c.view == view);
            serde_json::to_string_pretty(&chart)?
        }
        None => serde_json::to_string_pretty(&snapshot)?,
    };
    println!("{}", output);

    Ok(())
}
