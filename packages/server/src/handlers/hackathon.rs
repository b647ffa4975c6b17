use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::{HackathonStatus, Role};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{hackathon, judge_assignment, prize, project, project_score, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::hackathon::*;
use crate::models::shared::{Pagination, page_params};
use crate::state::AppState;
use crate::utils::hackathon::{
    find_hackathon, find_hackathon_for_update, hackathon_responses, load_assignments,
};

fn prize_models(hackathon_id: i32, prizes: &[PrizeInput]) -> Vec<prize::ActiveModel> {
    let now = Utc::now();
    prizes
        .iter()
        .enumerate()
        .map(|(index, p)| prize::ActiveModel {
            hackathon_id: Set(hackathon_id),
            title: Set(p.title.trim().to_string()),
            amount_cents: Set(p.amount_cents()),
            currency: Set(p.currency_code()),
            winners: Set(p.winners.unwrap_or(1)),
            position: Set(index as i32 + 1),
            created_at: Set(now),
            ..Default::default()
        })
        .collect()
}

async fn replace_prizes(
    txn: &DatabaseTransaction,
    hackathon_id: i32,
    prizes: &[PrizeInput],
) -> Result<(), AppError> {
    prize::Entity::delete_many()
        .filter(prize::Column::HackathonId.eq(hackathon_id))
        .exec(txn)
        .await?;
    if !prizes.is_empty() {
        prize::Entity::insert_many(prize_models(hackathon_id, prizes))
            .exec_without_returning(txn)
            .await?;
    }
    Ok(())
}

async fn single_response<C: ConnectionTrait>(
    db: &C,
    model: hackathon::Model,
) -> Result<HackathonResponse, AppError> {
    hackathon_responses(db, vec![model], Utc::now())
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Hackathon view missing".into()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Hackathons",
    operation_id = "listHackathons",
    summary = "List hackathons",
    description = "Paginated, newest first. Each item carries its derived status, prizes and assigned judges. `status` filters on the time window relative to now.",
    params(HackathonListQuery),
    responses(
        (status = 200, description = "Hackathons", body = HackathonListResponse),
        (status = 400, description = "Invalid query (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_hackathons(
    State(state): State<AppState>,
    Query(query): Query<HackathonListQuery>,
) -> Result<Json<HackathonListResponse>, AppError> {
    let (page, per_page) = page_params(query.page, query.per_page);
    let now = Utc::now();

    let mut select = hackathon::Entity::find();
    select = match query.status {
        Some(HackathonStatus::Upcoming) => select.filter(hackathon::Column::StartTime.gt(now)),
        Some(HackathonStatus::Ongoing) => select
            .filter(hackathon::Column::StartTime.lte(now))
            .filter(hackathon::Column::EndTime.gte(now)),
        Some(HackathonStatus::Completed) => select.filter(hackathon::Column::EndTime.lt(now)),
        None => select,
    };

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let models = select
        .order_by_desc(hackathon::Column::CreatedAt)
        .order_by_desc(hackathon::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let data = hackathon_responses(&state.db, models, now).await?;

    Ok(Json(HackathonListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Hackathons",
    operation_id = "createHackathon",
    summary = "Create a hackathon",
    description = "Creates a hackathon and its prizes. Prize `position` follows request order starting at 1. Requires admin.",
    request_body = CreateHackathonRequest,
    responses(
        (status = 201, description = "Hackathon created", body = HackathonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateHackathonRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_hackathon(&payload)?;

    let now = Utc::now();
    let txn = state.db.begin().await?;

    let model = hackathon::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        start_time: Set(payload.start_time),
        end_time: Set(payload.end_time),
        rules: Set(payload.rules),
        banner: Set(payload.banner),
        team_size_limit: Set(payload.team_size_limit.unwrap_or(5)),
        total_participants: Set(0),
        total_projects: Set(0),
        created_by: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if !payload.prizes.is_empty() {
        prize::Entity::insert_many(prize_models(model.id, &payload.prizes))
            .exec_without_returning(&txn)
            .await?;
    }

    let response = single_response(&txn, model).await?;
    txn.commit().await?;

    tracing::info!(hackathon_id = response.id, prizes = response.prizes.len(), "Hackathon created");
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Hackathons",
    operation_id = "getHackathon",
    summary = "Get a hackathon by ID",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Hackathon details", body = HackathonResponse),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_hackathon(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<HackathonResponse>, AppError> {
    let model = find_hackathon(&state.db, id).await?;
    Ok(Json(single_response(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Hackathons",
    operation_id = "updateHackathon",
    summary = "Update a hackathon",
    description = "Partial update. A `prizes` array replaces every existing prize. The time window is validated against stored values when only one bound changes. Requires admin.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = UpdateHackathonRequest,
    responses(
        (status = 200, description = "Hackathon updated", body = HackathonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateHackathonRequest>,
) -> Result<Json<HackathonResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_hackathon(&payload)?;

    if payload == UpdateHackathonRequest::default() {
        let existing = find_hackathon(&state.db, id).await?;
        return Ok(Json(single_response(&state.db, existing).await?));
    }

    let txn = state.db.begin().await?;
    let existing = find_hackathon_for_update(&txn, id).await?;

    // Cross-field time validation against existing values
    validate_time_window(
        payload.start_time.unwrap_or(existing.start_time),
        payload.end_time.unwrap_or(existing.end_time),
    )?;

    let mut active: hackathon::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(start_time) = payload.start_time {
        active.start_time = Set(start_time);
    }
    if let Some(end_time) = payload.end_time {
        active.end_time = Set(end_time);
    }
    if let Some(rules) = payload.rules {
        active.rules = Set(rules);
    }
    if let Some(banner) = payload.banner {
        active.banner = Set(banner);
    }
    if let Some(limit) = payload.team_size_limit {
        active.team_size_limit = Set(limit);
    }
    active.updated_at = Set(Utc::now());

    let model = active.update(&txn).await?;

    if let Some(ref prizes) = payload.prizes {
        replace_prizes(&txn, id, prizes).await?;
    }

    let response = single_response(&txn, model).await?;
    txn.commit().await?;

    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Hackathons",
    operation_id = "deleteHackathon",
    summary = "Delete a hackathon",
    description = "Permanently deletes a hackathon and cascade-deletes its prizes, judge assignments, projects and their scores. Requires admin.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 204, description = "Hackathon deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;
    find_hackathon_for_update(&txn, id).await?;

    let scores = project_score::Entity::delete_many()
        .filter(
            project_score::Column::ProjectId.in_subquery(
                SeaQuery::select()
                    .column(project::Column::Id)
                    .from(project::Entity)
                    .and_where(project::Column::HackathonId.eq(id))
                    .to_owned(),
            ),
        )
        .exec(&txn)
        .await?;
    let projects = project::Entity::delete_many()
        .filter(project::Column::HackathonId.eq(id))
        .exec(&txn)
        .await?;
    judge_assignment::Entity::delete_many()
        .filter(judge_assignment::Column::HackathonId.eq(id))
        .exec(&txn)
        .await?;
    prize::Entity::delete_many()
        .filter(prize::Column::HackathonId.eq(id))
        .exec(&txn)
        .await?;
    hackathon::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        hackathon_id = id,
        projects = projects.rows_affected,
        scores = scores.rows_affected,
        "Hackathon deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

async fn assigned_judges<C: ConnectionTrait>(
    db: &C,
    hackathon_id: i32,
) -> Result<Vec<AssignedJudgeResponse>, AppError> {
    let mut map = load_assignments(db, &[hackathon_id]).await?;
    Ok(map
        .remove(&hackathon_id)
        .unwrap_or_default()
        .into_iter()
        .map(|(a, u)| AssignedJudgeResponse {
            id: u.id,
            name: u.name,
            email: u.email,
            expertise: u.expertise,
            avatar: u.avatar,
            assigned_by: a.assigned_by,
            assigned_at: a.assigned_at,
        })
        .collect())
}

#[utoipa::path(
    get,
    path = "/{id}/judges",
    tag = "Judge Assignments",
    operation_id = "listHackathonJudges",
    summary = "List judges assigned to a hackathon",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Assigned judges", body = Vec<AssignedJudgeResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_judges(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<AssignedJudgeResponse>>, AppError> {
    auth_user.require_judge()?;
    find_hackathon(&state.db, id).await?;
    Ok(Json(assigned_judges(&state.db, id).await?))
}

#[utoipa::path(
    post,
    path = "/{id}/judges",
    tag = "Judge Assignments",
    operation_id = "assignJudges",
    summary = "Replace the judges assigned to a hackathon",
    description = "The given list becomes the complete assignment set. Every ID must belong to an active judge. An empty list clears all assignments. Requires admin.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = JudgeIdsRequest,
    responses(
        (status = 200, description = "Assignments replaced", body = Vec<AssignedJudgeResponse>),
        (status = 400, description = "Unknown or inactive judge (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, count = payload.judge_ids.len()))]
pub async fn assign_judges(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<JudgeIdsRequest>,
) -> Result<Json<Vec<AssignedJudgeResponse>>, AppError> {
    auth_user.require_admin()?;
    validate_judge_ids(&payload)?;

    let txn = state.db.begin().await?;
    find_hackathon_for_update(&txn, id).await?;

    if !payload.judge_ids.is_empty() {
        let found: Vec<i32> = user::Entity::find()
            .filter(user::Column::Id.is_in(payload.judge_ids.clone()))
            .filter(user::Column::Role.eq(Role::Judge))
            .filter(user::Column::IsActive.eq(true))
            .select_only()
            .column(user::Column::Id)
            .into_tuple()
            .all(&txn)
            .await?;
        let invalid: Vec<String> = payload
            .judge_ids
            .iter()
            .filter(|judge_id| !found.contains(judge_id))
            .map(|judge_id| judge_id.to_string())
            .collect();
        if !invalid.is_empty() {
            return Err(AppError::Validation(format!(
                "Not active judges: {}",
                invalid.join(", ")
            )));
        }
    }

    judge_assignment::Entity::delete_many()
        .filter(judge_assignment::Column::HackathonId.eq(id))
        .exec(&txn)
        .await?;

    if !payload.judge_ids.is_empty() {
        let now = Utc::now();
        let rows = payload
            .judge_ids
            .iter()
            .map(|&judge_id| judge_assignment::ActiveModel {
                hackathon_id: Set(id),
                judge_id: Set(judge_id),
                assigned_by: Set(auth_user.user_id),
                assigned_at: Set(now),
            });
        judge_assignment::Entity::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
    }

    let judges = assigned_judges(&txn, id).await?;
    txn.commit().await?;

    tracing::info!(hackathon_id = id, judges = judges.len(), "Judges assigned");
    Ok(Json(judges))
}

#[utoipa::path(
    delete,
    path = "/{id}/judges",
    tag = "Judge Assignments",
    operation_id = "removeJudges",
    summary = "Remove specific judges from a hackathon",
    description = "Deletes only the listed assignments; others are untouched. IDs that are not assigned are ignored. Existing scores are kept. Requires admin.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = JudgeIdsRequest,
    responses(
        (status = 200, description = "Assignments removed", body = RemoveJudgesResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, count = payload.judge_ids.len()))]
pub async fn remove_judges(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<JudgeIdsRequest>,
) -> Result<Json<RemoveJudgesResponse>, AppError> {
    auth_user.require_admin()?;
    validate_judge_ids(&payload)?;
    if payload.judge_ids.is_empty() {
        return Err(AppError::Validation("judge_ids must not be empty".into()));
    }

    find_hackathon(&state.db, id).await?;

    let result = judge_assignment::Entity::delete_many()
        .filter(judge_assignment::Column::HackathonId.eq(id))
        .filter(judge_assignment::Column::JudgeId.is_in(payload.judge_ids))
        .exec(&state.db)
        .await?;

    tracing::info!(hackathon_id = id, removed = result.rows_affected, "Judges removed");
    Ok(Json(RemoveJudgesResponse {
        removed: result.rows_affected,
    }))
}
