//! Lifecycle and geometry tests for the three chart variants.

use super::*;
use crate::analysis::{
    CommitAggregator, CommitQuery, CommitSeries, QualityAggregator, QualityQuery, QualitySeries,
    VelocityAggregator, VelocityQuery, VelocitySeries,
};
use crate::error::ChartError;
use crate::types::{CommitRecord, QualityRecord, StoryRecord, StoryStatus};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

fn commit_series() -> CommitSeries {
    let commits = vec![
        CommitRecord::new("c1", "2025-05-01", "a", "r1"),
        CommitRecord::new("c2", "2025-05-01", "b", "r1"),
        CommitRecord::new("c3", "2025-05-02", "a", "r2"),
    ];
    CommitAggregator::aggregate(&commits, &CommitQuery::default()).unwrap()
}

fn quality_series() -> QualitySeries {
    let records = vec![
        QualityRecord::new("2025-05-02").with_metric("bugs", 5.0).with_metric("coverage", 90.0),
        QualityRecord::new("2025-05-01").with_metric("bugs", 3.0).with_metric("coverage", 80.0),
    ];
    QualityAggregator::aggregate(&records, &QualityQuery::default()).unwrap()
}

fn velocity_series() -> VelocitySeries {
    let stories = vec![
        StoryRecord::new("Sprint 1", "s1", 5.0, StoryStatus::Done),
        StoryRecord::new("Sprint 1", "s2", 3.0, StoryStatus::Todo),
        StoryRecord::new("Sprint 2", "s3", 8.0, StoryStatus::Done),
        StoryRecord::new("Sprint 3", "s4", 2.0, StoryStatus::InProgress),
    ];
    VelocityAggregator::aggregate(&stories, &VelocityQuery::default()).unwrap()
}

fn commit_chart(series: CommitSeries) -> CommitChart {
    let mut chart = CommitChart::new(
        "commits",
        Container::new(400.0, 300.0),
        ChartTheme::light(),
        ChartOptions::default(),
    )
    .unwrap()
    .with_data(series);
    chart.init().unwrap();
    chart
}

fn rect_of(scene: &Scene, key: &str) -> scene::Rect {
    match scene.get(key).map(|e| &e.shape) {
        Some(Shape::Rect { rect, .. }) => *rect,
        other => panic!("{} is not a rect: {:?}", key, other),
    }
}

fn texts(scene: &Scene, layer: Layer) -> Vec<String> {
    scene
        .layer(layer)
        .filter_map(|e| match &e.shape {
            Shape::Text { content, .. } => Some(content.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_empty_id_is_a_configuration_error() {
    let result = CommitChart::new(
        " ",
        Container::new(400.0, 300.0),
        ChartTheme::light(),
        ChartOptions::default(),
    );
    assert!(matches!(result, Err(ChartError::Configuration(_))));
}

#[test]
fn test_render_before_init_fails() {
    let mut chart = CommitChart::new(
        "commits",
        Container::new(400.0, 300.0),
        ChartTheme::light(),
        ChartOptions::default(),
    )
    .unwrap();
    assert!(matches!(chart.render(), Err(ChartError::NotInitialized(_))));
    assert_eq!(chart.state(), LifecycleState::Uninitialized);
}

#[test]
fn test_init_twice_is_harmless() {
    let mut chart = commit_chart(commit_series());
    assert_ok!(chart.init());
    assert_eq!(chart.state(), LifecycleState::Initialized);
}

#[test]
fn test_rerender_is_idempotent() {
    let mut chart = commit_chart(commit_series());
    chart.render().unwrap();
    let first = chart.scene().clone();

    let diff = chart.render().unwrap();
    assert!(diff.is_empty());
    assert_eq!(diff.unchanged, first.len());
    assert_eq!(chart.scene(), &first);

    let keys: HashSet<&str> = first.elements.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys.len(), first.len());
}

#[test]
fn test_commit_bars_scale_and_shade() {
    let mut chart = commit_chart(commit_series());
    chart.render().unwrap();
    let scene = chart.scene();
    let style = ChartStyle::default();

    assert_eq!(scene.layer(Layer::Bar).count(), 2);
    let tall = rect_of(scene, "bar:2025-05-01");
    let short = rect_of(scene, "bar:2025-05-02");
    assert!((tall.height - 2.0 * short.height).abs() < 1e-9);
    // 10% headroom keeps the tallest bar below the top of the plot area
    assert!(tall.y > 20.0);
    assert!((tall.y + tall.height - 270.0).abs() < 1e-9);

    match &scene.get("bar:2025-05-01").map(|e| &e.shape) {
        Some(Shape::Rect { fill, .. }) => assert_eq!(*fill, style.bar_high),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(texts(scene, Layer::Label), vec!["Date", "Commit Count"]);
}

#[test]
fn test_commit_tooltip_hit_test() {
    let mut chart = commit_chart(commit_series());
    chart.render().unwrap();
    let bar = rect_of(chart.scene(), "bar:2025-05-01");
    let center = Point::new(bar.x + bar.width / 2.0, bar.y + bar.height / 2.0);

    let tooltip = chart.tooltip_at(center).map(Tooltip::text);
    assert_eq!(
        tooltip.as_deref(),
        Some("Date: 5/1/2025\nCommits: 2\nAuthors: 2")
    );
    assert!(chart.tooltip_at(Point::new(1.0, 1.0)).is_none());
}

#[test]
fn test_update_data_removes_stale_elements() {
    let mut chart = commit_chart(commit_series());
    chart.render().unwrap();

    let single = CommitAggregator::aggregate(
        &[CommitRecord::new("c9", "2025-05-02", "a", "r1")],
        &CommitQuery::default(),
    )
    .unwrap();
    let diff = chart.update_data(single).unwrap();

    assert!(diff.removed.contains(&"bar:2025-05-01".to_string()));
    assert!(diff.updated.contains(&"bar:2025-05-02".to_string()));
    assert_eq!(chart.scene().layer(Layer::Bar).count(), 1);
}

#[test]
fn test_empty_series_shows_no_data() {
    let mut chart = commit_chart(CommitSeries::default());
    chart.render().unwrap();

    assert_eq!(chart.status(), RenderStatus::NoData);
    assert_eq!(texts(chart.scene(), Layer::Placeholder), vec!["No data available"]);
    assert_eq!(chart.scene().layer(Layer::Bar).count(), 0);

    let diff = chart.update_data(commit_series()).unwrap();
    assert_eq!(chart.status(), RenderStatus::Drawn);
    assert_eq!(diff.removed, vec!["no-data".to_string()]);
}

#[test]
fn test_destroy_is_terminal() {
    let mut chart = commit_chart(commit_series());
    assert_ok!(chart.render());
    assert_ok!(chart.destroy());

    assert_eq!(chart.state(), LifecycleState::Destroyed);
    assert!(chart.scene().is_empty());
    assert!(matches!(chart.render(), Err(ChartError::Destroyed(_))));
    assert!(matches!(chart.resize(), Err(ChartError::Destroyed(_))));
    assert!(matches!(
        chart.update_data(commit_series()),
        Err(ChartError::Destroyed(_))
    ));
    assert!(matches!(chart.init(), Err(ChartError::Destroyed(_))));
    let err = assert_err!(chart.destroy());
    assert_eq!(err.to_string(), "chart 'commits' used after destroy()");
}

#[test]
fn test_mounted_chart_follows_container_until_destroyed() {
    let container = Container::new(400.0, 300.0);
    let chart = CommitChart::new(
        "commits",
        container.clone(),
        ChartTheme::light(),
        ChartOptions::default(),
    )
    .unwrap()
    .with_data(commit_series())
    .mount()
    .unwrap();
    assert_eq!(container.observer_count(), 1);

    container.set_size(Size::new(800.0, 300.0));
    let wide = rect_of(chart.lock().unwrap().scene(), "bar:2025-05-01");
    assert_eq!(chart.lock().unwrap().scene().width, 800.0);
    assert!(wide.width > 145.0 * 2.0);

    chart.lock().unwrap().destroy().unwrap();
    assert_eq!(container.observer_count(), 0);
    container.set_size(Size::new(200.0, 100.0));
    assert!(chart.lock().unwrap().scene().is_empty());
}

#[test]
fn test_dropping_mounted_chart_releases_observer() {
    let container = Container::new(400.0, 300.0);
    let chart = CommitChart::new(
        "commits",
        container.clone(),
        ChartTheme::light(),
        ChartOptions::default(),
    )
    .unwrap()
    .mount()
    .unwrap();
    drop(chart);
    assert_eq!(container.observer_count(), 0);
}

#[test]
fn test_lifecycle_events_are_published() {
    let mut chart = commit_chart(commit_series());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _sub = chart.on_event(move |event| {
        let name = match event {
            ChartEvent::Rendered { .. } => "rendered",
            ChartEvent::Resized(_) => "resized",
            ChartEvent::Destroyed => "destroyed",
        };
        sink.lock().unwrap().push(name);
    });

    chart.render().unwrap();
    chart.resize().unwrap();
    chart.destroy().unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["rendered", "rendered", "resized", "destroyed"]
    );
}

#[test]
fn test_option_size_overrides_container() {
    let mut chart = commit_chart(commit_series());
    chart
        .update_options(ChartOptionsPatch {
            width: Some(Some(640.0)),
            title: Some("Commit Activity".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(chart.scene().width, 640.0);
    assert_eq!(chart.scene().height, 300.0);
    assert!(texts(chart.scene(), Layer::Label).contains(&"Commit Activity".to_string()));

    chart
        .update_options(ChartOptionsPatch {
            width: Some(None),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(chart.scene().width, 400.0);
}

fn quality_chart(options: ChartOptions) -> QualityChart {
    let mut chart = QualityChart::new(
        "quality",
        Container::new(400.0, 300.0),
        ChartTheme::light(),
        options,
    )
    .unwrap()
    .with_data(quality_series());
    chart.init().unwrap();
    chart.render().unwrap();
    chart
}

#[test]
fn test_quality_coverage_uses_secondary_axis() {
    let chart = quality_chart(ChartOptions::default());
    let scene = chart.scene();

    assert!(scene.get("y2-axis:domain").is_some());
    assert!(scene.get("label:y2").is_some());
    assert_eq!(scene.layer(Layer::Line).count(), 4);

    let coverage = scene.get("marker:coverage:0").unwrap();
    match &coverage.shape {
        Shape::Circle { center, radius, .. } => {
            assert!((center.x - 40.0).abs() < 1e-9);
            assert!((center.y - 70.0).abs() < 1e-9);
            assert_eq!(*radius, 4.0);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(
        coverage.tooltip.as_ref().map(Tooltip::text).as_deref(),
        Some("Date: 5/1/2025\nCoverage: 80%")
    );
    assert_eq!(
        texts(scene, Layer::Legend),
        vec!["Bugs", "Vulnerabilities", "Code Smells", "Coverage"]
    );
}

#[test]
fn test_quality_metric_colors_follow_palette_index() {
    let chart = quality_chart(ChartOptions::default());
    let palette = &chart.theme().palette;
    for (i, metric) in ["bugs", "vulnerabilities", "codeSmells", "coverage"].iter().enumerate() {
        match chart.scene().get(&format!("line:{}", metric)).map(|e| &e.shape) {
            Some(Shape::Path { stroke, curve, .. }) => {
                assert_eq!(*stroke, palette.color(i));
                assert_eq!(*curve, scene::Curve::MonotoneX);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[test]
fn test_quality_without_coverage_has_single_axis() {
    let options = ChartOptions {
        metrics: vec!["bugs".to_string()],
        ..Default::default()
    };
    let chart = quality_chart(options);
    assert!(chart.scene().get("y2-axis:domain").is_none());
    assert_eq!(chart.scene().layer(Layer::Line).count(), 1);
    assert_eq!(chart.scene().layer(Layer::Marker).count(), 2);
}

fn velocity_chart(series: VelocitySeries, options: ChartOptions) -> VelocityChart {
    let mut chart = VelocityChart::new(
        "velocity",
        Container::new(600.0, 400.0),
        ChartTheme::light(),
        options,
    )
    .unwrap()
    .with_data(series);
    chart.init().unwrap();
    chart.render().unwrap();
    chart
}

#[test]
fn test_velocity_bars_line_and_summary() {
    let chart = velocity_chart(velocity_series(), ChartOptions::default());
    let scene = chart.scene();

    assert_eq!(scene.layer(Layer::Bar).count(), 6);
    match &scene.get("line:velocity").map(|e| &e.shape) {
        Some(Shape::Path { dash, points, .. }) => {
            assert_eq!(*dash, Some((5.0, 5.0)));
            assert_eq!(points.len(), 3);
        }
        other => panic!("unexpected {:?}", other),
    }
    match &scene.get("bar:total:Sprint 1").map(|e| &e.shape) {
        Some(Shape::Rect { opacity, .. }) => assert_eq!(*opacity, 0.5),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(
        texts(scene, Layer::Summary),
        vec!["Avg Velocity: 4.3 pts", "Completion: 72%", "Total Points: 18"]
    );
    assert_eq!(
        texts(scene, Layer::Legend),
        vec!["Total Points", "Completed Points", "Velocity"]
    );
}

#[test]
fn test_velocity_tooltips() {
    let chart = velocity_chart(velocity_series(), ChartOptions::default());
    let scene = chart.scene();
    let tip = |key: &str| {
        scene
            .get(key)
            .and_then(|e| e.tooltip.as_ref())
            .map(Tooltip::text)
            .unwrap_or_default()
    };

    assert_eq!(
        tip("bar:completed:Sprint 1"),
        "Sprint: Sprint 1\nCompleted Points: 5\nCompletion Rate: 63%"
    );
    assert_eq!(tip("bar:total:Sprint 3"), "Sprint: Sprint 3\nTotal Points: 2\nStories: 1");
    assert_eq!(
        tip("marker:velocity:Sprint 2"),
        "Sprint: Sprint 2\nVelocity: 6.5 points/sprint"
    );
}

#[test]
fn test_velocity_line_is_optional() {
    let hidden = velocity_chart(
        velocity_series(),
        ChartOptions {
            show_velocity: false,
            ..Default::default()
        },
    );
    assert!(hidden.scene().get("line:velocity").is_none());
    assert_eq!(hidden.scene().layer(Layer::Marker).count(), 0);

    let single = VelocityAggregator::aggregate(
        &[StoryRecord::new("Sprint 1", "s1", 3.0, StoryStatus::Todo)],
        &VelocityQuery::default(),
    )
    .unwrap();
    let chart = velocity_chart(single, ChartOptions::default());
    assert!(chart.scene().get("line:velocity").is_none());
    let rate = chart
        .scene()
        .get("bar:completed:Sprint 1")
        .and_then(|e| e.tooltip.as_ref())
        .map(Tooltip::text)
        .unwrap_or_default();
    assert!(rate.ends_with("Completion Rate: 0%"));
}

#[test]
fn test_velocity_window_option_reshapes_line() {
    let mut chart = velocity_chart(velocity_series(), ChartOptions::default());
    let before = chart.scene().get("line:velocity").cloned();

    let diff = chart
        .update_options(ChartOptionsPatch {
            velocity_window: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert!(diff.updated.contains(&"line:velocity".to_string()));
    assert_ne!(chart.scene().get("line:velocity").cloned(), before);
}
