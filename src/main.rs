//! Developer Productivity Charts demo
//!
//! Runs the simulated record feed for a few seconds, keeps three charts in
//! sync with it and writes the final frames as SVG files.
//!
//! Usage: `devcharts [OUTPUT_DIR] [SECONDS]`

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Runtime;

use devcharts::analysis::{CommitAggregator, QualityAggregator, VelocityAggregator};
use devcharts::feed::{DataFeed, FeedKind, FeedUpdate, PeriodicFeed, Simulator};
use devcharts::plotting::{
    backend, Chart, ChartKind, ChartOptions, ChartTheme, ChartType, CommitChart, Container,
    QualityChart, Size, VelocityChart, Visualization,
};

const FEED_INTERVAL: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "charts".to_string()));
    let seconds: u64 = match args.next() {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("SECONDS must be a whole number, got '{}'", raw))?,
        None => 5,
    };

    let rt = Runtime::new().context("failed to start tokio runtime")?;
    rt.block_on(run(&out_dir, Duration::from_secs(seconds)))
}

async fn run(out_dir: &Path, duration: Duration) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create {}", out_dir.display()))?;

    let simulator = Simulator::new(42, Utc::now().date_naive());
    let container = Container::new(900.0, 450.0);
    let theme = ChartTheme::light();

    let commit_options = ChartOptions::preset(ChartType::Commit);
    let commits = CommitAggregator::aggregate(simulator.commits(), &commit_options.commit_query())?;
    let commit_chart = CommitChart::new("commits", container.clone(), theme.clone(), commit_options)?
        .with_data(commits)
        .mount()?;

    let quality_options = ChartOptions::preset(ChartType::Quality);
    let quality =
        QualityAggregator::aggregate(simulator.quality(), &quality_options.quality_query())?;
    let quality_chart = QualityChart::new("quality", container.clone(), theme.clone(), quality_options)?
        .with_data(quality)
        .mount()?;

    let velocity_options = ChartOptions::preset(ChartType::Velocity);
    let velocity =
        VelocityAggregator::aggregate(simulator.stories(), &velocity_options.velocity_query())?;
    let velocity_chart = VelocityChart::new("velocity", container.clone(), theme, velocity_options)?
        .with_data(velocity)
        .mount()?;

    let feed = DataFeed::new();
    let _subscriptions = [
        feed.bind(FeedKind::Commits, &commit_chart, |update, options| match update {
            FeedUpdate::Commits(records) => {
                CommitAggregator::aggregate(records, &options.commit_query()).map(Some)
            }
            _ => Ok(None),
        }),
        feed.bind(FeedKind::Quality, &quality_chart, |update, options| match update {
            FeedUpdate::Quality(records) => {
                QualityAggregator::aggregate(records, &options.quality_query()).map(Some)
            }
            _ => Ok(None),
        }),
        feed.bind(FeedKind::Velocity, &velocity_chart, |update, options| match update {
            FeedUpdate::Velocity(records) => {
                VelocityAggregator::aggregate(records, &options.velocity_query()).map(Some)
            }
            _ => Ok(None),
        }),
    ];

    let periodic = PeriodicFeed::start(simulator, feed.clone(), FEED_INTERVAL);
    tokio::time::sleep(duration / 2).await;
    container.set_size(Size::new(1200.0, 500.0));
    tokio::time::sleep(duration / 2).await;
    periodic.stop().await;

    save(&commit_chart, &out_dir.join("commits.svg"))?;
    save(&quality_chart, &out_dir.join("quality.svg"))?;
    save(&velocity_chart, &out_dir.join("velocity.svg"))?;

    if let Some(FeedUpdate::Commits(records)) = feed.latest(FeedKind::Commits) {
        log::info!("{} commits in the last feed update", records.len());
    }
    Ok(())
}

fn save<K: ChartKind>(chart: &Arc<Mutex<Chart<K>>>, path: &Path) -> Result<()> {
    let mut chart = chart
        .lock()
        .map_err(|_| anyhow::anyhow!("chart lock poisoned"))?;
    backend::save_svg(chart.scene(), path)?;
    log::info!(
        "chart '{}' ({} elements, {:?})",
        chart.id(),
        chart.scene().len(),
        chart.status()
    );
    chart.destroy()?;
    Ok(())
}
