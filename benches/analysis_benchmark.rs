/// Benchmark module for aggregation and chart layout.
/// Measures bucketing of a large commit history, scene building and SVG output.
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use devcharts::analysis::{CommitAggregator, QualityAggregator, VelocityAggregator};
use devcharts::feed::{FeedKind, RecordSource, Simulator};
use devcharts::plotting::{
    backend, ChartOptions, ChartTheme, ChartType, CommitChart, Container, VelocityChart,
    Visualization,
};
use devcharts::types::{CommitRecord, Granularity};

/// A simulated source run until its commit window is full (2,880 commits
/// at one commit per 15 minutes) with many sprints closed
fn large_history() -> Simulator {
    let mut simulator = Simulator::new(2024, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    for _ in 0..5_000 {
        simulator.next(FeedKind::Commits);
        simulator.next(FeedKind::Velocity);
    }
    simulator
}

/// Benchmark aggregation at each granularity
///
/// # Arguments
/// * `c` - Criterion benchmark configuration
fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    let simulator = large_history();
    let commits: Vec<CommitRecord> = simulator.commits().to_vec();

    for granularity in [Granularity::Daily, Granularity::Weekly, Granularity::Monthly] {
        let options = ChartOptions {
            granularity,
            ..ChartOptions::default()
        };
        group.bench_function(format!("commits_{}", granularity), |b| {
            b.iter(|| CommitAggregator::aggregate(black_box(&commits), &options.commit_query()).unwrap())
        });
    }

    let options = ChartOptions::default();
    group.bench_function("quality", |b| {
        b.iter(|| {
            QualityAggregator::aggregate(black_box(simulator.quality()), &options.quality_query()).unwrap()
        })
    });
    group.bench_function("velocity", |b| {
        b.iter(|| {
            VelocityAggregator::aggregate(black_box(simulator.stories()), &options.velocity_query())
                .unwrap()
        })
    });

    group.finish();
}

/// Benchmark scene rendering and SVG output
///
/// # Arguments
/// * `c` - Criterion benchmark configuration
fn bench_plotting(c: &mut Criterion) {
    let mut group = c.benchmark_group("plotting");
    let simulator = large_history();

    let options = ChartOptions::preset(ChartType::Commit);
    let series = CommitAggregator::aggregate(simulator.commits(), &options.commit_query()).unwrap();
    let mut commit_chart = CommitChart::new("bench", Container::new(1200.0, 600.0), ChartTheme::light(), options)
        .unwrap()
        .with_data(series);
    commit_chart.init().unwrap();

    group.bench_function("commit_render", |b| b.iter(|| commit_chart.render().unwrap()));
    group.bench_function("commit_svg", |b| {
        b.iter(|| backend::render_svg(black_box(commit_chart.scene())).unwrap())
    });

    let options = ChartOptions::preset(ChartType::Velocity);
    let series = VelocityAggregator::aggregate(simulator.stories(), &options.velocity_query()).unwrap();
    let mut velocity_chart = VelocityChart::new("bench", Container::new(1200.0, 600.0), ChartTheme::light(), options)
        .unwrap()
        .with_data(series);
    velocity_chart.init().unwrap();

    group.bench_function("velocity_render", |b| b.iter(|| velocity_chart.render().unwrap()));

    group.finish();
}

criterion_group!(benches, bench_analysis, bench_plotting);
criterion_main!(benches);
