//! Per-project score aggregation.
//!
//! Averages are always derived from the full set of score sheets on read and
//! never stored, so they cannot go stale.

use serde::Serialize;

use crate::rubric::{Criterion, MAX_TOTAL_SCORE, ScoreSheet};

/// Averages of one project's score sheets, rounded half-up to 2 decimals.
///
/// A project with no sheets reports zero everywhere (never NaN), which keeps
/// leaderboard ordering well-defined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ScoreAggregate {
    /// Number of judges who scored the project.
    #[schema(example = 2)]
    pub total_scores: u32,
    /// Mean of the judges' totals (out of 40).
    #[schema(example = 27.0)]
    pub average_score: f64,
    #[schema(example = 7.0)]
    pub average_innovation: f64,
    #[schema(example = 6.5)]
    pub average_design: f64,
    #[schema(example = 7.5)]
    pub average_functionality: f64,
    #[schema(example = 6.0)]
    pub average_presentation: f64,
    /// Sum of every judge's total, kept exact for weighted statistics.
    #[serde(skip)]
    pub points: i64,
}

impl ScoreAggregate {
    /// Highest total the project could have reached with its current judges.
    pub fn total_possible_score(&self) -> i64 {
        self.total_scores as i64 * MAX_TOTAL_SCORE as i64
    }

    /// Points earned as a percentage of [`Self::total_possible_score`].
    pub fn score_percentage(&self) -> f64 {
        let possible = self.total_possible_score();
        if possible == 0 {
            return 0.0;
        }
        round_ratio(self.points * 100, possible, 2)
    }

    pub fn criterion_average(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::Innovation => self.average_innovation,
            Criterion::Design => self.average_design,
            Criterion::Functionality => self.average_functionality,
            Criterion::Presentation => self.average_presentation,
        }
    }
}

/// Aggregate a project's score sheets. The result does not depend on the
/// order of `sheets`.
pub fn aggregate<S: ScoreSheet>(sheets: &[S]) -> ScoreAggregate {
    let count = sheets.len() as i64;
    if count == 0 {
        return ScoreAggregate::default();
    }

    let mut sums = [0i64; 4];
    let mut points = 0i64;
    for sheet in sheets {
        for (sum, criterion) in sums.iter_mut().zip(Criterion::ALL) {
            *sum += sheet.criterion(criterion) as i64;
        }
        points += sheet.total() as i64;
    }

    ScoreAggregate {
        total_scores: count as u32,
        average_score: round_ratio(points, count, 2),
        average_innovation: round_ratio(sums[0], count, 2),
        average_design: round_ratio(sums[1], count, 2),
        average_functionality: round_ratio(sums[2], count, 2),
        average_presentation: round_ratio(sums[3], count, 2),
        points,
    }
}

/// `numerator / denominator` rounded half away from zero to `places` decimals.
///
/// Rounding happens on the exact rational in integer arithmetic, so values
/// such as `2.675` round up consistently instead of depending on binary
/// float representation. Returns 0 when `denominator` is 0.
pub fn round_ratio(numerator: i64, denominator: i64, places: u32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let scale = 10i128.pow(places);
    let num = numerator as i128 * scale;
    let den = denominator as i128;
    let negative = (num < 0) != (den < 0);
    let (num, den) = (num.abs(), den.abs());
    let mut scaled = (2 * num + den) / (2 * den);
    if negative {
        scaled = -scaled;
    }
    scaled as f64 / scale as f64
}
