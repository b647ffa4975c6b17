use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::{HackathonStatus, aggregate};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::ExprTrait;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{hackathon, project, project_score};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::project::*;
use crate::models::score::ScoreResponse;
use crate::models::shared::{Pagination, page_params};
use crate::state::AppState;
use crate::utils::hackathon::{
    find_active_project, find_active_project_for_update, find_hackathon,
    find_hackathon_for_update, judge_summary, load_users,
};

/// Shift a hackathon's denormalised counters by the given deltas.
async fn adjust_counters(
    txn: &DatabaseTransaction,
    hackathon_id: i32,
    projects: i32,
    participants: i32,
) -> Result<(), AppError> {
    hackathon::Entity::update_many()
        .col_expr(
            hackathon::Column::TotalProjects,
            Expr::col(hackathon::Column::TotalProjects).add(projects),
        )
        .col_expr(
            hackathon::Column::TotalParticipants,
            Expr::col(hackathon::Column::TotalParticipants).add(participants),
        )
        .filter(hackathon::Column::Id.eq(hackathon_id))
        .exec(txn)
        .await?;
    Ok(())
}

fn check_team_size(team_size: i32, limit: i32) -> Result<(), AppError> {
    if team_size > limit {
        return Err(AppError::InvalidState(format!(
            "team_size {team_size} exceeds this hackathon's limit of {limit}"
        )));
    }
    Ok(())
}

/// Batch-load every score row for the given projects.
async fn scores_by_project<C: ConnectionTrait>(
    db: &C,
    project_ids: Vec<i32>,
) -> Result<HashMap<i32, Vec<project_score::Model>>, AppError> {
    let mut map: HashMap<i32, Vec<project_score::Model>> = HashMap::new();
    if project_ids.is_empty() {
        return Ok(map);
    }
    let rows = project_score::Entity::find()
        .filter(project_score::Column::ProjectId.is_in(project_ids))
        .all(db)
        .await?;
    for row in rows {
        map.entry(row.project_id).or_default().push(row);
    }
    Ok(map)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Projects",
    operation_id = "listProjects",
    summary = "List active projects",
    description = "Paginated, newest submission first, each with its average score and number of judges who scored it.",
    params(ProjectListQuery),
    responses(
        (status = 200, description = "Projects", body = ProjectListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_projects(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<ProjectListResponse>, AppError> {
    auth_user.require_judge()?;
    let (page, per_page) = page_params(query.page, query.per_page);

    let mut select = project::Entity::find().filter(project::Column::IsActive.eq(true));
    if let Some(hackathon_id) = query.hackathon_id {
        select = select.filter(project::Column::HackathonId.eq(hackathon_id));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let projects = select
        .order_by_desc(project::Column::SubmittedAt)
        .order_by_desc(project::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let mut scores = scores_by_project(&state.db, projects.iter().map(|p| p.id).collect()).await?;

    let data = projects
        .into_iter()
        .map(|p| {
            let agg = aggregate(&scores.remove(&p.id).unwrap_or_default());
            ProjectListItem::new(p, &agg)
        })
        .collect();

    Ok(Json(ProjectListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Projects",
    operation_id = "submitProject",
    summary = "Submit a project",
    description = "Public endpoint used by teams. Rejected once the hackathon has ended or when the team is larger than the hackathon allows. Updates the hackathon's project and participant counters.",
    request_body = SubmitProjectRequest,
    responses(
        (status = 201, description = "Project submitted", body = SubmittedProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR) or hackathon ended (INVALID_STATE)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(hackathon_id = payload.hackathon_id, team = %payload.team_name))]
pub async fn submit_project(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SubmitProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_submit_project(&payload)?;
    let team_size = payload.team_size.unwrap_or(1);

    let txn = state.db.begin().await?;
    let hackathon = find_hackathon_for_update(&txn, payload.hackathon_id).await?;

    let now = Utc::now();
    if HackathonStatus::at(hackathon.start_time, hackathon.end_time, now)
        == HackathonStatus::Completed
    {
        return Err(AppError::InvalidState(
            "Submissions are closed for this hackathon".into(),
        ));
    }
    check_team_size(team_size, hackathon.team_size_limit)?;

    let technologies = normalize_technologies(&payload.technologies);
    let model = project::ActiveModel {
        hackathon_id: Set(hackathon.id),
        team_name: Set(payload.team_name.trim().to_string()),
        description: Set(payload.description),
        github_link: Set(payload.github_link.trim().to_string()),
        demo_link: Set(payload.demo_link.map(|d| d.trim().to_string())),
        team_size: Set(team_size),
        technologies: Set(serde_json::json!(technologies)),
        is_active: Set(true),
        submitted_at: Set(now),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    adjust_counters(&txn, hackathon.id, 1, team_size).await?;
    txn.commit().await?;

    tracing::info!(project_id = model.id, hackathon_id = hackathon.id, "Project submitted");
    Ok((
        StatusCode::CREATED,
        Json(SubmittedProjectResponse::from(model)),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Projects",
    operation_id = "getProject",
    summary = "Get a project with its scores",
    description = "Returns the project, its score aggregate and every judge's sheet, newest first.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project details", body = ProjectDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectDetailResponse>, AppError> {
    auth_user.require_judge()?;
    let project = find_active_project(&state.db, id).await?;
    let hackathon = find_hackathon(&state.db, project.hackathon_id).await?;

    let scores = project_score::Entity::find()
        .filter(project_score::Column::ProjectId.eq(id))
        .order_by_desc(project_score::Column::ScoredAt)
        .all(&state.db)
        .await?;
    let agg = aggregate(&scores);
    let users = load_users(&state.db, scores.iter().map(|s| s.judge_id)).await?;

    Ok(Json(ProjectDetailResponse {
        id: project.id,
        hackathon: ProjectHackathon {
            id: hackathon.id,
            status: HackathonStatus::at(hackathon.start_time, hackathon.end_time, Utc::now()),
            name: hackathon.name,
        },
        technologies: technologies_of(&project),
        team_name: project.team_name,
        description: project.description,
        github_link: project.github_link,
        demo_link: project.demo_link,
        team_size: project.team_size,
        submitted_at: project.submitted_at,
        updated_at: project.updated_at,
        aggregate: agg,
        scores: scores
            .into_iter()
            .map(|s| {
                let judge = judge_summary(&users, s.judge_id);
                ScoreResponse::new(s, judge)
            })
            .collect(),
    }))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Projects",
    operation_id = "updateProject",
    summary = "Update a project",
    description = "Partial update. A team size change is reflected in the hackathon's participant counter. Requires admin.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = SubmittedProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProjectRequest>,
) -> Result<Json<SubmittedProjectResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_project(&payload)?;

    if payload == UpdateProjectRequest::default() {
        let existing = find_active_project(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;
    let existing = find_active_project_for_update(&txn, id).await?;
    let hackathon_id = existing.hackathon_id;
    let old_team_size = existing.team_size;

    if let Some(team_size) = payload.team_size {
        let hackathon = find_hackathon(&txn, hackathon_id).await?;
        check_team_size(team_size, hackathon.team_size_limit)?;
    }

    let mut active: project::ActiveModel = existing.into();

    if let Some(ref name) = payload.team_name {
        active.team_name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(ref link) = payload.github_link {
        active.github_link = Set(link.trim().to_string());
    }
    if let Some(demo) = payload.demo_link {
        active.demo_link = Set(demo.map(|d| d.trim().to_string()));
    }
    if let Some(team_size) = payload.team_size {
        active.team_size = Set(team_size);
    }
    if let Some(ref technologies) = payload.technologies {
        active.technologies = Set(serde_json::json!(normalize_technologies(technologies)));
    }
    active.updated_at = Set(Utc::now());

    let model = active.update(&txn).await?;

    let delta = model.team_size - old_team_size;
    if delta != 0 {
        adjust_counters(&txn, hackathon_id, 0, delta).await?;
    }
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Projects",
    operation_id = "deleteProject",
    summary = "Withdraw a project",
    description = "Soft delete: the project is hidden from listings and the leaderboard, and the hackathon's counters are decremented. Scores are kept. Requires admin.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project withdrawn"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;
    let existing = find_active_project_for_update(&txn, id).await?;
    let (hackathon_id, team_size) = (existing.hackathon_id, existing.team_size);

    let mut active: project::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now());
    active.update(&txn).await?;

    adjust_counters(&txn, hackathon_id, -1, -team_size).await?;
    txn.commit().await?;

    tracing::info!(project_id = id, hackathon_id, "Project withdrawn");
    Ok(StatusCode::NO_CONTENT)
}
