//! Leaderboard ordering and hackathon-wide statistics.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{ScoreAggregate, round_ratio};

/// A project competing on a leaderboard.
pub trait Contender {
    fn aggregate(&self) -> &ScoreAggregate;

    /// Submission time; earlier submissions win otherwise exact ties.
    fn submitted_at(&self) -> DateTime<Utc>;

    /// Stable identity used as the last tie-break.
    fn id(&self) -> i32;
}

/// A contender with its 1-based position.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub rank: u32,
    pub entry: T,
}

/// Leaderboard order: higher average first, then more judges, then earlier
/// submission, then lower id. Total, so no two contenders share a rank.
pub fn compare<T: Contender>(a: &T, b: &T) -> Ordering {
    let (x, y) = (a.aggregate(), b.aggregate());
    y.average_score
        .total_cmp(&x.average_score)
        .then_with(|| y.total_scores.cmp(&x.total_scores))
        .then_with(|| a.submitted_at().cmp(&b.submitted_at()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Sort contenders into leaderboard order and assign dense ranks `1..=N`.
pub fn rank<T: Contender>(mut contenders: Vec<T>) -> Vec<Ranked<T>> {
    contenders.sort_by(compare);
    contenders
        .into_iter()
        .enumerate()
        .map(|(index, entry)| Ranked {
            rank: index as u32 + 1,
            entry,
        })
        .collect()
}

/// Hackathon-wide figures shown above the leaderboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, utoipa::ToSchema)]
pub struct LeaderboardStatistics {
    /// Active projects on the leaderboard.
    #[schema(example = 12)]
    pub total_projects: u32,
    /// Score sheets submitted across all projects.
    #[schema(example = 30)]
    pub total_submissions: u32,
    /// Judge-count-weighted mean of the project averages.
    #[schema(example = 26.4)]
    pub average_score_overall: f64,
    /// Best project average.
    #[schema(example = 34.5)]
    pub highest_score: f64,
    /// Worst project average.
    #[schema(example = 0.0)]
    pub lowest_score: f64,
}

/// Summarise a set of project aggregates. An empty set yields all zeros.
pub fn statistics<'a, I>(aggregates: I) -> LeaderboardStatistics
where
    I: IntoIterator<Item = &'a ScoreAggregate>,
{
    let mut stats = LeaderboardStatistics::default();
    let mut points = 0i64;
    let mut highest: Option<f64> = None;
    let mut lowest: Option<f64> = None;

    for agg in aggregates {
        stats.total_projects += 1;
        stats.total_submissions += agg.total_scores;
        points += agg.points;
        highest = Some(highest.map_or(agg.average_score, |h| h.max(agg.average_score)));
        lowest = Some(lowest.map_or(agg.average_score, |l| l.min(agg.average_score)));
    }

    stats.average_score_overall = round_ratio(points, stats.total_submissions as i64, 2);
    stats.highest_score = highest.unwrap_or_default();
    stats.lowest_score = lowest.unwrap_or_default();
    stats
}
