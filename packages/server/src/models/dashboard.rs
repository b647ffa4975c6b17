use common::HackathonStatus;
use common::completion::Completion;
use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct DashboardOverview {
    /// Active users of any role.
    pub total_users: u64,
    pub total_judges: u64,
    pub total_hackathons: u64,
    /// Active projects.
    pub total_projects: u64,
    pub total_scores: u64,
}

#[derive(Serialize, Default, Debug, PartialEq, utoipa::ToSchema)]
pub struct HackathonsByStatus {
    pub upcoming: u64,
    pub ongoing: u64,
    pub completed: u64,
}

impl HackathonsByStatus {
    pub fn count(&mut self, status: HackathonStatus) {
        match status {
            HackathonStatus::Upcoming => self.upcoming += 1,
            HackathonStatus::Ongoing => self.ongoing += 1,
            HackathonStatus::Completed => self.completed += 1,
        }
    }
}

/// Activity in the trailing 30 days.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RecentActivity {
    pub new_users: u64,
    pub new_projects: u64,
    pub new_scores: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TopHackathon {
    pub id: i32,
    pub name: String,
    pub status: HackathonStatus,
    pub total_projects: i32,
    pub total_participants: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JudgeStat {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub assignment_count: u64,
    pub score_count: u64,
}

/// Distribution of `total_score` over every recorded score.
#[derive(Serialize, Default, utoipa::ToSchema)]
pub struct ScoringStats {
    pub total_scores: u64,
    #[schema(example = 27.35)]
    pub average_score: f64,
    pub highest_score: i32,
    pub lowest_score: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompletionRate {
    pub hackathon_id: i32,
    pub hackathon_name: String,
    #[serde(flatten)]
    pub completion: Completion,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DashboardStatsResponse {
    pub overview: DashboardOverview,
    pub hackathons_by_status: HackathonsByStatus,
    pub recent_activity: RecentActivity,
    pub top_hackathons: Vec<TopHackathon>,
    pub judge_stats: Vec<JudgeStat>,
    pub scoring_stats: ScoringStats,
    pub completion_rates: Vec<CompletionRate>,
}
