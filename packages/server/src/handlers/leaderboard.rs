use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use common::leaderboard::{rank, statistics};
use common::{HackathonStatus, aggregate};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{project, project_score};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::leaderboard::*;
use crate::models::project::technologies_of;
use crate::state::AppState;
use crate::utils::hackathon::{find_hackathon, judge_summary, load_users};

#[utoipa::path(
    get,
    path = "/{hackathon_id}",
    tag = "Leaderboard",
    operation_id = "getLeaderboard",
    summary = "Ranked projects of a hackathon",
    description = "Active projects ranked by average total score (descending), then by number of judges who scored them (descending). Unscored projects have an average of 0 and rank last. Ranks are 1..N with no gaps; exact ties fall back to submission time, then project ID. Averages are rounded half-up to 2 decimals.",
    params(("hackathon_id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Leaderboard", body = LeaderboardResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(hackathon_id))]
pub async fn get_leaderboard(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    auth_user.require_judge()?;
    let hackathon = find_hackathon(&state.db, hackathon_id).await?;

    let projects = project::Entity::find()
        .filter(project::Column::HackathonId.eq(hackathon_id))
        .filter(project::Column::IsActive.eq(true))
        .all(&state.db)
        .await?;

    let project_ids: Vec<i32> = projects.iter().map(|p| p.id).collect();
    let scores = if project_ids.is_empty() {
        Vec::new()
    } else {
        project_score::Entity::find()
            .filter(project_score::Column::ProjectId.is_in(project_ids))
            .order_by_asc(project_score::Column::ScoredAt)
            .all(&state.db)
            .await?
    };
    let users = load_users(&state.db, scores.iter().map(|s| s.judge_id)).await?;

    let mut by_project: HashMap<i32, Vec<project_score::Model>> = HashMap::new();
    for s in scores {
        by_project.entry(s.project_id).or_default().push(s);
    }

    let standings: Vec<Standing> = projects
        .into_iter()
        .map(|p| {
            let sheets = by_project.remove(&p.id).unwrap_or_default();
            let aggregate = aggregate(&sheets);
            let judge_scores = sheets
                .into_iter()
                .map(|s| JudgeBreakdown {
                    judge: judge_summary(&users, s.judge_id),
                    innovation: s.innovation,
                    design: s.design,
                    functionality: s.functionality,
                    presentation: s.presentation,
                    total_score: s.total_score,
                    comments: s.comments,
                    scored_at: s.scored_at,
                })
                .collect();
            Standing {
                technologies: technologies_of(&p),
                project_id: p.id,
                team_name: p.team_name,
                github_link: p.github_link,
                demo_link: p.demo_link,
                team_size: p.team_size,
                submitted_at: p.submitted_at,
                aggregate,
                judge_scores,
            }
        })
        .collect();

    let statistics = statistics(standings.iter().map(|s| &s.aggregate));
    let leaderboard = rank(standings)
        .into_iter()
        .map(|r| LeaderboardEntry::new(r.rank, r.entry))
        .collect();

    Ok(Json(LeaderboardResponse {
        hackathon: LeaderboardHackathon {
            id: hackathon.id,
            status: HackathonStatus::at(hackathon.start_time, hackathon.end_time, Utc::now()),
            name: hackathon.name,
            start_time: hackathon.start_time,
            end_time: hackathon.end_time,
        },
        leaderboard,
        statistics,
    }))
}
