//! The judging rubric: four criteria, each scored 1-10 by a judge.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest score a judge may give on a single criterion.
pub const MIN_CRITERION_SCORE: i32 = 1;
/// Highest score a judge may give on a single criterion.
pub const MAX_CRITERION_SCORE: i32 = 10;
/// Highest possible total for one judge's score sheet.
pub const MAX_TOTAL_SCORE: i32 = MAX_CRITERION_SCORE * Criterion::ALL.len() as i32;

/// A single rubric criterion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Innovation,
    Design,
    Functionality,
    Presentation,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Self::Innovation,
        Self::Design,
        Self::Functionality,
        Self::Presentation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Innovation => "innovation",
            Self::Design => "design",
            Self::Functionality => "functionality",
            Self::Presentation => "presentation",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RubricError {
    #[error("{criterion} score must be an integer between 1 and 10, got {value}")]
    OutOfRange { criterion: Criterion, value: i64 },
}

/// Anything that carries one judge's four criterion scores.
///
/// Implemented by validated [`RubricScores`] and by persisted score rows, so
/// the aggregator works on either.
pub trait ScoreSheet {
    fn criterion(&self, criterion: Criterion) -> i32;

    fn total(&self) -> i32 {
        Criterion::ALL.iter().map(|c| self.criterion(*c)).sum()
    }
}

/// One judge's validated scores for one project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RubricScores {
    innovation: i32,
    design: i32,
    functionality: i32,
    presentation: i32,
}

impl RubricScores {
    /// Validate raw inputs. Every criterion must lie in
    /// [`MIN_CRITERION_SCORE`]..=[`MAX_CRITERION_SCORE`]; the first offending
    /// criterion (in rubric order) is reported.
    pub fn new(
        innovation: i64,
        design: i64,
        functionality: i64,
        presentation: i64,
    ) -> Result<Self, RubricError> {
        let raw = [innovation, design, functionality, presentation];
        let mut checked = [0i32; 4];
        for (i, (criterion, value)) in Criterion::ALL.iter().zip(raw).enumerate() {
            checked[i] = check(*criterion, value)?;
        }
        let [innovation, design, functionality, presentation] = checked;
        Ok(Self {
            innovation,
            design,
            functionality,
            presentation,
        })
    }

    pub fn innovation(&self) -> i32 {
        self.innovation
    }

    pub fn design(&self) -> i32 {
        self.design
    }

    pub fn functionality(&self) -> i32 {
        self.functionality
    }

    pub fn presentation(&self) -> i32 {
        self.presentation
    }
}

impl ScoreSheet for RubricScores {
    fn criterion(&self, criterion: Criterion) -> i32 {
        match criterion {
            Criterion::Innovation => self.innovation,
            Criterion::Design => self.design,
            Criterion::Functionality => self.functionality,
            Criterion::Presentation => self.presentation,
        }
    }
}

fn check(criterion: Criterion, value: i64) -> Result<i32, RubricError> {
    if (MIN_CRITERION_SCORE as i64..=MAX_CRITERION_SCORE as i64).contains(&value) {
        Ok(value as i32)
    } else {
        Err(RubricError::OutOfRange { criterion, value })
    }
}
