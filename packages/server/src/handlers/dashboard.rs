use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use chrono::{Duration, Utc};
use common::aggregate::round_ratio;
use common::completion::completion;
use common::{HackathonStatus, Role};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{hackathon, judge_assignment, project, project_score, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::dashboard::*;
use crate::state::AppState;

const RECENT_DAYS: i64 = 30;
const TOP_HACKATHONS: usize = 5;
const TOP_JUDGES: usize = 10;

/// `GROUP BY` count keyed on an integer column.
async fn grouped_counts<E, C>(
    db: &C,
    select: Select<E>,
    key: E::Column,
) -> Result<HashMap<i32, u64>, AppError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let rows: Vec<(i32, i64)> = select
        .select_only()
        .column(key)
        .column_as(key.count(), "count")
        .group_by(key)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|(k, n)| (k, n as u64)).collect())
}

async fn scoring_stats(db: &DatabaseConnection) -> Result<ScoringStats, AppError> {
    let row: Option<(i64, Option<i64>, Option<i32>, Option<i32>)> = project_score::Entity::find()
        .select_only()
        .column_as(project_score::Column::TotalScore.count(), "count")
        .column_as(project_score::Column::TotalScore.sum(), "sum")
        .column_as(project_score::Column::TotalScore.max(), "max")
        .column_as(project_score::Column::TotalScore.min(), "min")
        .into_tuple()
        .one(db)
        .await?;

    let Some((count, sum, max, min)) = row else {
        return Ok(ScoringStats::default());
    };
    Ok(ScoringStats {
        total_scores: count as u64,
        average_score: round_ratio(sum.unwrap_or(0), count, 2),
        highest_score: max.unwrap_or(0),
        lowest_score: min.unwrap_or(0),
    })
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Dashboard",
    operation_id = "getDashboardStats",
    summary = "Admin dashboard statistics",
    description = "Platform-wide counts, hackathons by derived status, activity over the last 30 days, the five hackathons with most projects, the ten judges with most assignments, the distribution of total scores, and judging completion for every ongoing hackathon. Computed on each request. Requires admin.",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardStatsResponse>, AppError> {
    auth_user.require_admin()?;
    let db = &state.db;
    let now = Utc::now();
    let since = now - Duration::days(RECENT_DAYS);

    let active_projects = || project::Entity::find().filter(project::Column::IsActive.eq(true));

    let overview = DashboardOverview {
        total_users: user::Entity::find()
            .filter(user::Column::IsActive.eq(true))
            .count(db)
            .await?,
        total_judges: user::Entity::find()
            .filter(user::Column::Role.eq(Role::Judge))
            .filter(user::Column::IsActive.eq(true))
            .count(db)
            .await?,
        total_hackathons: hackathon::Entity::find().count(db).await?,
        total_projects: active_projects().count(db).await?,
        total_scores: project_score::Entity::find().count(db).await?,
    };

    let recent_activity = RecentActivity {
        new_users: user::Entity::find()
            .filter(user::Column::CreatedAt.gte(since))
            .count(db)
            .await?,
        new_projects: active_projects()
            .filter(project::Column::SubmittedAt.gte(since))
            .count(db)
            .await?,
        new_scores: project_score::Entity::find()
            .filter(project_score::Column::ScoredAt.gte(since))
            .count(db)
            .await?,
    };

    let hackathons = hackathon::Entity::find()
        .order_by_desc(hackathon::Column::TotalProjects)
        .order_by_asc(hackathon::Column::Id)
        .all(db)
        .await?;

    let mut hackathons_by_status = HackathonsByStatus::default();
    let mut ongoing = Vec::new();
    for h in &hackathons {
        let status = HackathonStatus::at(h.start_time, h.end_time, now);
        hackathons_by_status.count(status);
        if status == HackathonStatus::Ongoing {
            ongoing.push(h);
        }
    }

    let top_hackathons = hackathons
        .iter()
        .take(TOP_HACKATHONS)
        .map(|h| TopHackathon {
            id: h.id,
            name: h.name.clone(),
            status: HackathonStatus::at(h.start_time, h.end_time, now),
            total_projects: h.total_projects,
            total_participants: h.total_participants,
        })
        .collect();

    let judges = user::Entity::find()
        .filter(user::Column::Role.eq(Role::Judge))
        .filter(user::Column::IsActive.eq(true))
        .all(db)
        .await?;
    let assignment_counts = grouped_counts(
        db,
        judge_assignment::Entity::find(),
        judge_assignment::Column::JudgeId,
    )
    .await?;
    let score_counts =
        grouped_counts(db, project_score::Entity::find(), project_score::Column::JudgeId).await?;

    let mut judge_stats: Vec<JudgeStat> = judges
        .into_iter()
        .map(|j| JudgeStat {
            assignment_count: assignment_counts.get(&j.id).copied().unwrap_or(0),
            score_count: score_counts.get(&j.id).copied().unwrap_or(0),
            id: j.id,
            name: j.name,
            email: j.email,
        })
        .collect();
    judge_stats.sort_by(|a, b| {
        b.assignment_count
            .cmp(&a.assignment_count)
            .then_with(|| a.id.cmp(&b.id))
    });
    judge_stats.truncate(TOP_JUDGES);

    let mut completion_rates = Vec::with_capacity(ongoing.len());
    if !ongoing.is_empty() {
        let ids: Vec<i32> = ongoing.iter().map(|h| h.id).collect();
        let project_counts = grouped_counts(
            db,
            active_projects().filter(project::Column::HackathonId.is_in(ids.clone())),
            project::Column::HackathonId,
        )
        .await?;
        let judge_counts = grouped_counts(
            db,
            judge_assignment::Entity::find()
                .filter(judge_assignment::Column::HackathonId.is_in(ids.clone())),
            judge_assignment::Column::HackathonId,
        )
        .await?;

        for h in ongoing {
            let actual = project_score::Entity::find()
                .filter(
                    project_score::Column::ProjectId.in_subquery(
                        SeaQuery::select()
                            .column(project::Column::Id)
                            .from(project::Entity)
                            .and_where(project::Column::HackathonId.eq(h.id))
                            .and_where(project::Column::IsActive.eq(true))
                            .to_owned(),
                    ),
                )
                .count(db)
                .await?;
            completion_rates.push(CompletionRate {
                hackathon_id: h.id,
                hackathon_name: h.name.clone(),
                completion: completion(
                    project_counts.get(&h.id).copied().unwrap_or(0),
                    judge_counts.get(&h.id).copied().unwrap_or(0),
                    actual,
                ),
            });
        }
    }

    Ok(Json(DashboardStatsResponse {
        overview,
        hackathons_by_status,
        recent_activity,
        top_hackathons,
        judge_stats,
        scoring_stats: scoring_stats(db).await?,
        completion_rates,
    }))
}
