use chrono::{DateTime, Utc};
use common::HackathonStatus;
use common::ScoreAggregate;
use common::leaderboard::{Contender, LeaderboardStatistics};
use serde::Serialize;

use super::shared::JudgeSummary;

/// One judge's sheet, as shown in the leaderboard breakdown.
#[derive(Serialize, utoipa::ToSchema)]
pub struct JudgeBreakdown {
    pub judge: JudgeSummary,
    pub innovation: i32,
    pub design: i32,
    pub functionality: i32,
    pub presentation: i32,
    pub total_score: i32,
    pub comments: Option<String>,
    pub scored_at: DateTime<Utc>,
}

/// A project before ranking.
pub struct Standing {
    pub project_id: i32,
    pub team_name: String,
    pub github_link: String,
    pub demo_link: Option<String>,
    pub team_size: i32,
    pub technologies: Vec<String>,
    pub submitted_at: DateTime<Utc>,
    pub aggregate: ScoreAggregate,
    pub judge_scores: Vec<JudgeBreakdown>,
}

impl Contender for Standing {
    fn aggregate(&self) -> &ScoreAggregate {
        &self.aggregate
    }

    fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    fn id(&self) -> i32 {
        self.project_id
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaderboardEntry {
    /// 1-based, dense.
    #[schema(example = 1)]
    pub rank: u32,
    pub project_id: i32,
    pub team_name: String,
    pub github_link: String,
    pub demo_link: Option<String>,
    pub team_size: i32,
    pub technologies: Vec<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub aggregate: ScoreAggregate,
    /// `total_scores * 40`.
    #[schema(example = 80)]
    pub total_possible_score: i64,
    #[schema(example = 67.5)]
    pub score_percentage: f64,
    pub judge_scores: Vec<JudgeBreakdown>,
}

impl LeaderboardEntry {
    pub fn new(rank: u32, s: Standing) -> Self {
        Self {
            rank,
            total_possible_score: s.aggregate.total_possible_score(),
            score_percentage: s.aggregate.score_percentage(),
            project_id: s.project_id,
            team_name: s.team_name,
            github_link: s.github_link,
            demo_link: s.demo_link,
            team_size: s.team_size,
            technologies: s.technologies,
            submitted_at: s.submitted_at,
            aggregate: s.aggregate,
            judge_scores: s.judge_scores,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaderboardHackathon {
    pub id: i32,
    pub name: String,
    pub status: HackathonStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaderboardResponse {
    pub hackathon: LeaderboardHackathon,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub statistics: LeaderboardStatistics,
}
