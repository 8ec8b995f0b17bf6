//! Record feeds.
//!
//! A [`DataFeed`] fans the latest raw records of each kind out to
//! subscribers. Something outside the charts decides when new records
//! arrive: a [`PeriodicFeed`] polling a [`RecordSource`], or the caller
//! publishing by hand.

pub mod periodic;
pub mod simulator;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use crate::error::{AnalysisError, ChartError};
use crate::events::{Observers, Subscription};
use crate::plotting::{Chart, ChartKind, ChartOptions, LifecycleState, Visualization};
use crate::types::{CommitRecord, QualityRecord, StoryRecord};

pub use periodic::PeriodicFeed;
pub use simulator::Simulator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Commits,
    Quality,
    Velocity,
}

impl FeedKind {
    pub const ALL: [FeedKind; 3] = [FeedKind::Commits, FeedKind::Quality, FeedKind::Velocity];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Commits => "commits",
            FeedKind::Quality => "quality",
            FeedKind::Velocity => "velocity",
        }
    }
}

impl FromStr for FeedKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commits" => Ok(FeedKind::Commits),
            "quality" => Ok(FeedKind::Quality),
            "velocity" => Ok(FeedKind::Velocity),
            other => Err(ChartError::Configuration(format!(
                "unknown feed type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The complete current record set for one feed kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    Commits(Vec<CommitRecord>),
    Quality(Vec<QualityRecord>),
    Velocity(Vec<StoryRecord>),
}

impl FeedUpdate {
    pub fn kind(&self) -> FeedKind {
        match self {
            FeedUpdate::Commits(_) => FeedKind::Commits,
            FeedUpdate::Quality(_) => FeedKind::Quality,
            FeedUpdate::Velocity(_) => FeedKind::Velocity,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FeedUpdate::Commits(records) => records.len(),
            FeedUpdate::Quality(records) => records.len(),
            FeedUpdate::Velocity(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Somewhere new records come from.
pub trait RecordSource: Send + 'static {
    /// Advance the source for `kind` and return every record it now holds.
    fn next(&mut self, kind: FeedKind) -> FeedUpdate;
}

#[derive(Default)]
struct Channels {
    commits: Observers<FeedUpdate>,
    quality: Observers<FeedUpdate>,
    velocity: Observers<FeedUpdate>,
    latest: Mutex<HashMap<FeedKind, FeedUpdate>>,
}

/// Per-kind subscriber lists. Clones publish to the same subscribers.
#[derive(Clone, Default)]
pub struct DataFeed {
    channels: Arc<Channels>,
}

impl DataFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn channel(&self, kind: FeedKind) -> &Observers<FeedUpdate> {
        match kind {
            FeedKind::Commits => &self.channels.commits,
            FeedKind::Quality => &self.channels.quality,
            FeedKind::Velocity => &self.channels.velocity,
        }
    }

    /// Call `callback` with every update of `kind` until the returned
    /// handle is unsubscribed or dropped.
    pub fn subscribe<F>(&self, kind: FeedKind, callback: F) -> Subscription
    where
        F: Fn(&FeedUpdate) + Send + Sync + 'static,
    {
        log::debug!("subscribed to {} feed", kind);
        self.channel(kind).subscribe(callback)
    }

    /// Remember `update` as the latest of its kind and deliver it. Returns
    /// the number of callbacks invoked.
    pub fn publish(&self, update: FeedUpdate) -> usize {
        let kind = update.kind();
        let delivered = self.channel(kind).notify(&update);
        log::debug!(
            "published {} {} records to {} subscribers",
            update.len(),
            kind,
            delivered
        );
        if let Ok(mut latest) = self.channels.latest.lock() {
            latest.insert(kind, update);
        }
        delivered
    }

    /// The most recently published update of `kind`, if any.
    pub fn latest(&self, kind: FeedKind) -> Option<FeedUpdate> {
        self.channels
            .latest
            .lock()
            .ok()
            .and_then(|latest| latest.get(&kind).cloned())
    }

    pub fn subscriber_count(&self, kind: FeedKind) -> usize {
        self.channel(kind).len()
    }

    /// Re-aggregate every update of `kind` and push the result into
    /// `chart`. `aggregate` returns `Ok(None)` for updates it cannot use.
    ///
    /// The chart is held weakly; updates stop once it is dropped or
    /// destroyed.
    pub fn bind<K, F>(&self, kind: FeedKind, chart: &Arc<Mutex<Chart<K>>>, aggregate: F) -> Subscription
    where
        K: ChartKind,
        F: Fn(&FeedUpdate, &ChartOptions) -> Result<Option<K::Data>, AnalysisError>
            + Send
            + Sync
            + 'static,
    {
        let weak = Arc::downgrade(chart);
        self.subscribe(kind, move |update| {
            let Some(chart) = weak.upgrade() else {
                return;
            };
            let Ok(mut chart) = chart.lock() else {
                return;
            };
            if chart.state() == LifecycleState::Destroyed {
                return;
            }
            match aggregate(update, chart.options()) {
                Ok(Some(data)) => {
                    if let Err(e) = chart.update_data(data) {
                        log::warn!("chart '{}' rejected {} update: {}", chart.id(), kind, e);
                    }
                }
                Ok(None) => log::debug!("chart '{}' ignored a {} update", chart.id(), update.kind()),
                Err(e) => log::error!("dropping {} update for chart '{}': {}", kind, chart.id(), e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_reaches_only_matching_kind() {
        let feed = DataFeed::new();
        let commits = Arc::new(AtomicUsize::new(0));
        let quality = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&commits);
        let _a = feed.subscribe(FeedKind::Commits, move |update| {
            seen.fetch_add(update.len(), Ordering::SeqCst);
        });
        let seen = Arc::clone(&quality);
        let _b = feed.subscribe(FeedKind::Quality, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let delivered = feed.publish(FeedUpdate::Commits(vec![
            CommitRecord::new("c1", "2025-05-01", "a", "r"),
            CommitRecord::new("c2", "2025-05-01", "b", "r"),
        ]));
        assert_eq!(delivered, 1);
        assert_eq!(commits.load(Ordering::SeqCst), 2);
        assert_eq!(quality.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let feed = DataFeed::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let sub = feed.subscribe(FeedKind::Velocity, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        feed.publish(FeedUpdate::Velocity(Vec::new()));
        sub.unsubscribe();
        feed.publish(FeedUpdate::Velocity(Vec::new()));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(feed.subscriber_count(FeedKind::Velocity), 0);
    }

    #[test]
    fn test_latest_keeps_last_update_per_kind() {
        let feed = DataFeed::new();
        assert!(feed.latest(FeedKind::Quality).is_none());

        let update = FeedUpdate::Quality(vec![QualityRecord::new("2025-05-01").with_metric("bugs", 2.0)]);
        feed.publish(update.clone());
        assert_eq!(feed.latest(FeedKind::Quality), Some(update));
        assert!(feed.latest(FeedKind::Commits).is_none());
    }

    #[test]
    fn test_bind_updates_chart_until_destroyed() {
        use crate::analysis::CommitAggregator;
        use crate::plotting::{ChartTheme, CommitChart, Container, Layer};

        let feed = DataFeed::new();
        let chart = CommitChart::new(
            "commits",
            Container::new(400.0, 300.0),
            ChartTheme::light(),
            ChartOptions::default(),
        )
        .unwrap()
        .mount()
        .unwrap();
        let _sub = feed.bind(FeedKind::Commits, &chart, |update, options| match update {
            FeedUpdate::Commits(records) => {
                CommitAggregator::aggregate(records, &options.commit_query()).map(Some)
            }
            _ => Ok(None),
        });

        feed.publish(FeedUpdate::Commits(vec![
            CommitRecord::new("c1", "2025-05-01", "a", "r"),
            CommitRecord::new("c2", "2025-05-03", "a", "r"),
        ]));
        assert_eq!(chart.lock().unwrap().scene().layer(Layer::Bar).count(), 2);

        feed.publish(FeedUpdate::Commits(vec![CommitRecord {
            date: Some("not a date".to_string()),
            ..Default::default()
        }]));
        assert_eq!(chart.lock().unwrap().scene().layer(Layer::Bar).count(), 2);

        chart.lock().unwrap().destroy().unwrap();
        feed.publish(FeedUpdate::Commits(vec![CommitRecord::new("c3", "2025-05-04", "b", "r")]));
        assert!(chart.lock().unwrap().scene().is_empty());
    }

    #[test]
    fn test_feed_kind_names() {
        for kind in FeedKind::ALL {
            assert_eq!(kind.as_str().parse::<FeedKind>().unwrap(), kind);
        }
        assert!("deploys".parse::<FeedKind>().is_err());
    }
}
