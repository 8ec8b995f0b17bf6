//! Seeded generator of plausible demo records.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{FeedKind, FeedUpdate, RecordSource};
use crate::analysis::parse_record_date;
use crate::types::{CommitRecord, QualityRecord, StoryRecord, StoryStatus};

const HISTORY_DAYS: i64 = 30;
const KEPT_SPRINTS: u32 = 8;
const SPRINT_DAYS: i64 = 14;
const COMMIT_STEP_MINUTES: i64 = 15;
const DEVELOPERS: [&str; 4] = [
    "alex@company.com",
    "sarah@company.com",
    "mike@company.com",
    "emma@company.com",
];
const REPOSITORIES: [&str; 4] = ["backend-api", "frontend-app", "mobile-app", "data-pipeline"];
const ACTIONS: [&str; 6] = ["Fixed", "Added", "Updated", "Refactored", "Optimized", "Implemented"];
const TARGETS: [&str; 6] = [
    "authentication",
    "user dashboard",
    "API endpoints",
    "database queries",
    "caching layer",
    "UI components",
];

/// Holds a rolling window of commits, quality snapshots and sprint stories
/// and mutates them a little on every [`RecordSource::next`] call.
pub struct Simulator {
    rng: StdRng,
    today: NaiveDate,
    /// Timestamp of the newest commit; the commit window ends here.
    clock: NaiveDateTime,
    sequence: u64,
    commits: Vec<CommitRecord>,
    quality: Vec<QualityRecord>,
    stories: Vec<StoryRecord>,
    sprint: u32,
}

impl Simulator {
    /// Thirty days of history ending at `today`, six closed sprints and one
    /// in progress.
    pub fn new(seed: u64, today: NaiveDate) -> Self {
        let mut sim = Self {
            rng: StdRng::seed_from_u64(seed),
            today,
            clock: today.and_time(NaiveTime::MIN) + Duration::hours(19),
            sequence: 0,
            commits: Vec::new(),
            quality: Vec::new(),
            stories: Vec::new(),
            sprint: 0,
        };

        for offset in (0..HISTORY_DAYS).rev() {
            let day = today - Duration::days(offset);
            sim.seed_day_commits(day);
            let record = QualityRecord::new(&day.format("%Y-%m-%d").to_string())
                .with_metric("bugs", sim.rng.gen_range(5..25) as f64)
                .with_metric("vulnerabilities", sim.rng.gen_range(0..10) as f64)
                .with_metric("codeSmells", sim.rng.gen_range(50..150) as f64)
                .with_metric("coverage", round1(sim.rng.gen_range(65.0..95.0)));
            sim.quality.push(record);
        }
        sim.commits.sort_by(|a, b| a.date.cmp(&b.date));

        for _ in 0..7 {
            sim.open_sprint();
        }
        for story in sim.stories.iter_mut().filter(|s| s.sprint.as_deref() != Some("Sprint 7")) {
            if sim.rng.gen_bool(0.8) {
                story.status = StoryStatus::Done;
            }
        }
        sim
    }

    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    pub fn quality(&self) -> &[QualityRecord] {
        &self.quality
    }

    pub fn stories(&self) -> &[StoryRecord] {
        &self.stories
    }

    /// Current records of `kind`, without advancing.
    pub fn snapshot(&self, kind: FeedKind) -> FeedUpdate {
        match kind {
            FeedKind::Commits => FeedUpdate::Commits(self.commits.clone()),
            FeedKind::Quality => FeedUpdate::Quality(self.quality.clone()),
            FeedKind::Velocity => FeedUpdate::Velocity(self.stories.clone()),
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{}-{}", prefix, self.sequence)
    }

    fn commit_on(&mut self, timestamp: String, message: String) -> CommitRecord {
        CommitRecord {
            message,
            ..CommitRecord::new(
                &self.next_id("commit"),
                &timestamp,
                DEVELOPERS[self.rng.gen_range(0..DEVELOPERS.len())],
                REPOSITORIES[self.rng.gen_range(0..REPOSITORIES.len())],
            )
        }
    }

    /// Weekdays get 5 to 19 commits, weekends 0 to 4, between 9:00 and 19:00.
    fn seed_day_commits(&mut self, day: NaiveDate) {
        let weekend = matches!(day.weekday(), Weekday::Sat | Weekday::Sun);
        let count = if weekend {
            self.rng.gen_range(0..5)
        } else {
            self.rng.gen_range(5..20)
        };
        for i in 0..count {
            let hour = self.rng.gen_range(9..19);
            let minute = self.rng.gen_range(0..60);
            let timestamp = format!("{}T{:02}:{:02}:00Z", day.format("%Y-%m-%d"), hour, minute);
            let commit = self.commit_on(timestamp, format!("Commit message for {} #{}", day, i));
            self.commits.push(commit);
        }
    }

    /// Appends a commit one step after the newest and drops commits that
    /// fell out of the window. Commits are kept in timestamp order.
    fn add_commit(&mut self) {
        self.clock += Duration::minutes(COMMIT_STEP_MINUTES);
        let message = format!(
            "{} {}",
            ACTIONS[self.rng.gen_range(0..ACTIONS.len())],
            TARGETS[self.rng.gen_range(0..TARGETS.len())]
        );
        let stamp = self.clock.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let commit = self.commit_on(stamp, message);
        self.commits.push(commit);

        let cutoff = self.clock - Duration::days(HISTORY_DAYS);
        let expired = self.commits.partition_point(|c| {
            c.date
                .as_deref()
                .and_then(parse_record_date)
                .map_or(true, |at| at <= cutoff)
        });
        self.commits.drain(..expired);
    }

    /// One more day of quality metrics drifting from the last snapshot.
    fn step_quality(&mut self) {
        let Some(last) = self.quality.last() else {
            return;
        };
        let date = last
            .date
            .as_deref()
            .and_then(parse_record_date)
            .map_or(self.today, |d| d.date())
            + Duration::days(1);
        let (bugs, vulnerabilities, smells, coverage) = (
            last.metric("bugs"),
            last.metric("vulnerabilities"),
            last.metric("codeSmells"),
            last.metric("coverage"),
        );

        let step = |rng: &mut StdRng, p: f64, up: f64, down: f64| if rng.gen_bool(p) { up } else { down };
        let record = QualityRecord::new(&date.format("%Y-%m-%d").to_string())
            .with_metric("bugs", (bugs + step(&mut self.rng, 0.3, 1.0, -1.0)).max(0.0))
            .with_metric(
                "vulnerabilities",
                (vulnerabilities + step(&mut self.rng, 0.2, 1.0, -1.0)).max(0.0),
            )
            .with_metric("codeSmells", (smells + step(&mut self.rng, 0.4, 3.0, -5.0)).max(0.0))
            .with_metric(
                "coverage",
                round1((coverage + (self.rng.gen::<f64>() - 0.3) * 2.0).clamp(0.0, 100.0)),
            );
        self.quality.push(record);
        if self.quality.len() > HISTORY_DAYS as usize {
            self.quality.remove(0);
        }
    }

    fn open_sprint(&mut self) {
        self.sprint += 1;
        let label = format!("Sprint {}", self.sprint);
        let start = self.today - Duration::days(SPRINT_DAYS * 6) + Duration::days(SPRINT_DAYS * (self.sprint as i64 - 1));
        for _ in 0..self.rng.gen_range(5..15) {
            let id = self.next_id("story");
            let points = self.rng.gen_range(1..=8) as f64;
            let mut story = StoryRecord::new(&label, &id, points, StoryStatus::Todo);
            story.date = Some(start.format("%Y-%m-%d").to_string());
            self.stories.push(story);
        }

        let oldest = self.sprint.saturating_sub(KEPT_SPRINTS);
        if oldest > 0 {
            let expired = format!("Sprint {}", oldest);
            self.stories.retain(|s| s.sprint.as_deref() != Some(expired.as_str()));
        }
    }

    /// Finish one open story of the current sprint, opening the next sprint
    /// once nothing is left.
    fn progress_sprint(&mut self) {
        let current = format!("Sprint {}", self.sprint);
        let open: Vec<usize> = self
            .stories
            .iter()
            .enumerate()
            .filter(|(_, s)| s.sprint.as_deref() == Some(current.as_str()) && !s.is_done())
            .map(|(i, _)| i)
            .collect();

        if open.is_empty() {
            self.open_sprint();
            return;
        }
        let pick = open[self.rng.gen_range(0..open.len())];
        self.stories[pick].status = StoryStatus::Done;
        for &i in &open {
            if i != pick && self.stories[i].status == StoryStatus::Todo && self.rng.gen_bool(0.3) {
                self.stories[i].status = StoryStatus::InProgress;
            }
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl RecordSource for Simulator {
    fn next(&mut self, kind: FeedKind) -> FeedUpdate {
        match kind {
            FeedKind::Commits => self.add_commit(),
            FeedKind::Quality => self.step_quality(),
            FeedKind::Velocity => self.progress_sprint(),
        }
        self.snapshot(kind)
    }
}
