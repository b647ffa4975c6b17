use chrono::{DateTime, Utc};
use common::{RubricError, RubricScores};
use serde::{Deserialize, Serialize};

use super::shared::JudgeSummary;
use crate::entity::project_score;
use crate::error::AppError;

const MAX_COMMENT_CHARS: usize = 5000;

/// A judge's score sheet for one project.
///
/// Scores are JSON integers; fractional values or strings fail to
/// deserialize and are reported as `VALIDATION_ERROR`.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitScoreRequest {
    #[schema(example = 8, minimum = 1, maximum = 10)]
    pub innovation: i64,
    #[schema(example = 7, minimum = 1, maximum = 10)]
    pub design: i64,
    #[schema(example = 9, minimum = 1, maximum = 10)]
    pub functionality: i64,
    #[schema(example = 6, minimum = 1, maximum = 10)]
    pub presentation: i64,
    #[schema(example = "Solid demo, thin docs")]
    pub comments: Option<String>,
}

impl SubmitScoreRequest {
    pub fn rubric(&self) -> Result<RubricScores, RubricError> {
        RubricScores::new(
            self.innovation,
            self.design,
            self.functionality,
            self.presentation,
        )
    }
}

/// Validate the sheet, returning the checked scores and the normalised comment.
pub fn validate_score(
    req: &SubmitScoreRequest,
) -> Result<(RubricScores, Option<String>), AppError> {
    let scores = req.rubric()?;
    let comments = req
        .comments
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned);
    if let Some(ref c) = comments
        && c.chars().count() > MAX_COMMENT_CHARS
    {
        return Err(AppError::Validation(format!(
            "Comments must be at most {MAX_COMMENT_CHARS} characters"
        )));
    }
    Ok((scores, comments))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ScoreResponse {
    pub project_id: i32,
    pub judge: JudgeSummary,
    pub innovation: i32,
    pub design: i32,
    pub functionality: i32,
    pub presentation: i32,
    /// Always the sum of the four criteria.
    #[schema(example = 30)]
    pub total_score: i32,
    pub comments: Option<String>,
    pub scored_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScoreResponse {
    pub fn new(m: project_score::Model, judge: JudgeSummary) -> Self {
        Self {
            project_id: m.project_id,
            judge,
            innovation: m.innovation,
            design: m.design,
            functionality: m.functionality,
            presentation: m.presentation,
            total_score: m.total_score,
            comments: m.comments,
            scored_at: m.scored_at,
            updated_at: m.updated_at,
        }
    }
}
