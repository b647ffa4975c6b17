//! Judging completion rates per hackathon.

use serde::Serialize;

use crate::aggregate::round_ratio;

/// Judging progress of one hackathon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Completion {
    #[schema(example = 10)]
    pub total_projects: u64,
    #[schema(example = 4)]
    pub total_judges: u64,
    /// Every assigned judge scoring every active project.
    #[schema(example = 40)]
    pub expected_scores: u64,
    #[schema(example = 25)]
    pub actual_scores: u64,
    /// `actual / expected` as a whole percentage, rounded half-up; 0 when
    /// nothing is expected. Not clamped: scores from admins or since-removed
    /// judges can push it past 100.
    #[schema(example = 63)]
    pub completion_rate: u64,
}

pub fn completion(total_projects: u64, total_judges: u64, actual_scores: u64) -> Completion {
    let expected_scores = total_projects * total_judges;
    let completion_rate = if expected_scores > 0 {
        round_ratio(actual_scores as i64 * 100, expected_scores as i64, 0) as u64
    } else {
        0
    };
    Completion {
        total_projects,
        total_judges,
        expected_scores,
        actual_scores,
        completion_rate,
    }
}
