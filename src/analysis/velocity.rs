//! Story points per sprint and rolling velocity.

use serde::Serialize;

use super::bucket::{SprintGrouper, TimeBucketer};
use super::commits::RecordFilter;
use crate::error::AnalysisError;
use crate::types::{Granularity, StoryRecord};
use crate::utils::{ratio_percent, rolling_mean, round_to};

pub const DEFAULT_VELOCITY_WINDOW: usize = 3;

/// Options for [`VelocityAggregator::aggregate`].
#[derive(Clone, Copy)]
pub struct VelocityQuery<'a> {
    /// `Sprint` groups by the story's sprint label; the time granularities
    /// group by the story date instead.
    pub grouping: Granularity,
    pub velocity_window: usize,
    pub filter: Option<RecordFilter<'a, StoryRecord>>,
}

impl Default for VelocityQuery<'_> {
    fn default() -> Self {
        Self {
            grouping: Granularity::Sprint,
            velocity_window: DEFAULT_VELOCITY_WINDOW,
            filter: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprintSummary {
    pub period: String,
    pub completed: f64,
    pub total: f64,
    pub stories: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VelocityPoint {
    pub period: String,
    pub velocity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VelocitySummary {
    pub total_stories: usize,
    pub total_points: f64,
    pub completed_points: f64,
    /// Mean completed points per sprint, one decimal.
    pub velocity: f64,
    /// Whole percent of points completed; 0 when no sprint has points.
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VelocitySeries {
    pub sprints: Vec<SprintSummary>,
    /// Aligned 1:1 with `sprints`.
    pub velocity: Vec<VelocityPoint>,
    pub summary: VelocitySummary,
}

impl VelocitySeries {
    pub fn is_empty(&self) -> bool {
        self.sprints.is_empty()
    }
}

pub struct VelocityAggregator;

impl VelocityAggregator {
    pub fn aggregate(
        records: &[StoryRecord],
        query: &VelocityQuery<'_>,
    ) -> Result<VelocitySeries, AnalysisError> {
        let window = if query.velocity_window == 0 {
            log::warn!(
                "velocity window must be positive; using {}",
                DEFAULT_VELOCITY_WINDOW
            );
            DEFAULT_VELOCITY_WINDOW
        } else {
            query.velocity_window
        };

        let filtered: Vec<(usize, &StoryRecord)> = records
            .iter()
            .enumerate()
            .filter(|(_, story)| query.filter.map_or(true, |keep| keep(*story)))
            .collect();

        let sprints: Vec<SprintSummary> = if query.grouping == Granularity::Sprint {
            SprintGrouper::group(filtered.iter().map(|(_, story)| *story))
                .into_iter()
                .map(|group| summarize_period(group.period, &group.stories))
                .collect()
        } else {
            TimeBucketer::bucket_indexed(filtered.iter().copied(), query.grouping)?
                .into_iter()
                .map(|(key, stories)| summarize_period(key.0, &stories))
                .collect()
        };

        let completed: Vec<f64> = sprints.iter().map(|s| s.completed).collect();
        let velocity = sprints
            .iter()
            .zip(rolling_mean(&completed, window))
            .map(|(sprint, velocity)| VelocityPoint {
                period: sprint.period.clone(),
                velocity,
            })
            .collect();

        let sprint_completed: f64 = completed.iter().sum();
        let sprint_total: f64 = sprints.iter().map(|s| s.total).sum();
        let mean_completed = if sprints.is_empty() {
            0.0
        } else {
            sprint_completed / sprints.len() as f64
        };

        let summary = VelocitySummary {
            total_stories: filtered.len(),
            total_points: filtered.iter().map(|(_, s)| s.points()).sum(),
            completed_points: filtered
                .iter()
                .filter(|(_, s)| s.is_done())
                .map(|(_, s)| s.points())
                .sum(),
            velocity: round_to(mean_completed, 1),
            completion_rate: ratio_percent(sprint_completed, sprint_total),
        };

        log::debug!(
            "aggregated {} stories into {} periods (window {})",
            filtered.len(),
            sprints.len(),
            window
        );

        Ok(VelocitySeries {
            sprints,
            velocity,
            summary,
        })
    }
}

fn summarize_period(period: String, stories: &[&StoryRecord]) -> SprintSummary {
    SprintSummary {
        period,
        completed: stories
            .iter()
            .filter(|s| s.is_done())
            .map(|s| s.points())
            .sum(),
        total: stories.iter().map(|s| s.points()).sum(),
        stories: stories.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StoryStatus;
    use pretty_assertions::assert_eq;

    fn done(sprint: &str, points: f64) -> StoryRecord {
        StoryRecord::new(sprint, "", points, StoryStatus::Done)
    }

    #[test]
    fn test_rolling_velocity_window_three() {
        let stories = vec![
            done("S1", 10.0),
            done("S2", 20.0),
            done("S3", 15.0),
            done("S4", 30.0),
        ];
        let result = VelocityAggregator::aggregate(&stories, &VelocityQuery::default()).unwrap();

        let velocity: Vec<f64> = result.velocity.iter().map(|v| round_to(v.velocity, 2)).collect();
        assert_eq!(velocity, vec![10.0, 15.0, 15.0, 21.67]);
        assert_eq!(result.velocity[3].period, "S4");
        assert_eq!(result.summary.velocity, 18.8);
        assert_eq!(result.summary.completion_rate, 100.0);
    }

    #[test]
    fn test_completed_and_total_per_sprint() {
        let stories = vec![
            done("Sprint 1", 5.0),
            StoryRecord::new("Sprint 1", "b", 3.0, StoryStatus::InProgress),
            StoryRecord::new("Sprint 1", "c", 2.0, StoryStatus::Todo),
            done("Sprint 2", 8.0),
        ];
        let result = VelocityAggregator::aggregate(&stories, &VelocityQuery::default()).unwrap();

        assert_eq!(
            result.sprints[0],
            SprintSummary {
                period: "Sprint 1".to_string(),
                completed: 5.0,
                total: 10.0,
                stories: 3,
            }
        );
        assert_eq!(
            result.summary,
            VelocitySummary {
                total_stories: 4,
                total_points: 18.0,
                completed_points: 13.0,
                velocity: 6.5,
                completion_rate: 72.0,
            }
        );
    }

    #[test]
    fn test_zero_points_completion_rate() {
        let stories = vec![
            StoryRecord::new("S1", "a", 0.0, StoryStatus::Done),
            StoryRecord {
                sprint: Some("S2".to_string()),
                points: None,
                ..Default::default()
            },
        ];
        let result = VelocityAggregator::aggregate(&stories, &VelocityQuery::default()).unwrap();
        assert_eq!(result.summary.completion_rate, 0.0);
        assert_eq!(result.summary.velocity, 0.0);
    }

    #[test]
    fn test_zero_window_falls_back_to_default() {
        let stories = vec![done("S1", 10.0), done("S2", 20.0), done("S3", 30.0)];
        let query = VelocityQuery {
            velocity_window: 0,
            ..Default::default()
        };
        let result = VelocityAggregator::aggregate(&stories, &query).unwrap();
        assert_eq!(result.velocity[2].velocity, 20.0);
    }

    #[test]
    fn test_monthly_grouping_uses_story_dates() {
        let mut a = done("S1", 3.0);
        a.date = Some("2025-04-20".to_string());
        let mut b = done("S1", 4.0);
        b.date = Some("2025-05-02".to_string());
        let query = VelocityQuery {
            grouping: Granularity::Monthly,
            ..Default::default()
        };
        let result = VelocityAggregator::aggregate(&[b, a], &query).unwrap();

        let periods: Vec<&str> = result.sprints.iter().map(|s| s.period.as_str()).collect();
        assert_eq!(periods, vec!["2025-04", "2025-05"]);
    }

    #[test]
    fn test_empty_input() {
        let result = VelocityAggregator::aggregate(&[], &VelocityQuery::default()).unwrap();
        assert!(result.is_empty());
        assert!(result.velocity.is_empty());
        assert_eq!(result.summary, VelocitySummary::default());
    }
}
