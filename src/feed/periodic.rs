//! Timer-driven publishing from a [`RecordSource`].

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{DataFeed, FeedKind, RecordSource};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

fn ticker(period: Duration) -> Interval {
    // first tick after one full period, not immediately
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Publishes commits every `interval`, quality every 1.5 intervals and
/// velocity every 2 intervals until stopped.
pub struct PeriodicFeed {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicFeed {
    /// Spawn the publishing task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start<S: RecordSource>(mut source: S, feed: DataFeed, interval: Duration) -> Self {
        let interval = if interval < MIN_INTERVAL {
            log::warn!("feed interval {:?} too small; using {:?}", interval, MIN_INTERVAL);
            MIN_INTERVAL
        } else {
            interval
        };
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let mut commits = ticker(interval);
            let mut quality = ticker(interval.mul_f64(1.5));
            let mut velocity = ticker(interval * 2);
            log::info!("periodic feed started every {:?}", interval);

            loop {
                let kind = tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = commits.tick() => FeedKind::Commits,
                    _ = quality.tick() => FeedKind::Quality,
                    _ = velocity.tick() => FeedKind::Velocity,
                };
                feed.publish(source.next(kind));
            }
            log::info!("periodic feed stopped");
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// Cancel the task and wait for it to exit. Once this returns no
    /// subscriber callback fires on its behalf.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                log::error!("periodic feed task failed: {}", e);
            }
        }
    }
}

impl Drop for PeriodicFeed {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
