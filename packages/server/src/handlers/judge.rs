use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::{HackathonStatus, Role};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{hackathon, judge_assignment, project_score, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::normalize_email;
use crate::models::judge::*;
use crate::models::shared::{Pagination, escape_like, page_params};
use crate::state::AppState;
use crate::utils::hash;

async fn find_judge<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .filter(user::Column::Role.eq(Role::Judge))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Judge not found".into()))
}

/// Attach assignment and scoring counts to a page of judges.
async fn judge_responses<C: ConnectionTrait>(
    db: &C,
    judges: Vec<user::Model>,
) -> Result<Vec<JudgeResponse>, AppError> {
    let ids: Vec<i32> = judges.iter().map(|j| j.id).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let now = Utc::now();

    let assignments = judge_assignment::Entity::find()
        .filter(judge_assignment::Column::JudgeId.is_in(ids.clone()))
        .all(db)
        .await?;

    let hackathon_ids: Vec<i32> = assignments.iter().map(|a| a.hackathon_id).collect();
    let hackathons: HashMap<i32, hackathon::Model> = if hackathon_ids.is_empty() {
        HashMap::new()
    } else {
        hackathon::Entity::find()
            .filter(hackathon::Column::Id.is_in(hackathon_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|h| (h.id, h))
            .collect()
    };

    let score_counts: HashMap<i32, i64> = project_score::Entity::find()
        .filter(project_score::Column::JudgeId.is_in(ids))
        .select_only()
        .column(project_score::Column::JudgeId)
        .column_as(project_score::Column::ProjectId.count(), "count")
        .group_by(project_score::Column::JudgeId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let mut by_judge: HashMap<i32, Vec<JudgeHackathon>> = HashMap::new();
    for a in &assignments {
        if let Some(h) = hackathons.get(&a.hackathon_id) {
            by_judge.entry(a.judge_id).or_default().push(JudgeHackathon {
                id: h.id,
                name: h.name.clone(),
                status: HackathonStatus::at(h.start_time, h.end_time, now),
                start_time: h.start_time,
                end_time: h.end_time,
            });
        }
    }

    Ok(judges
        .into_iter()
        .map(|j| {
            let mut hackathons = by_judge.remove(&j.id).unwrap_or_default();
            hackathons.sort_by(|a, b| b.start_time.cmp(&a.start_time));
            JudgeResponse {
                total_assignments: hackathons.len() as u64,
                active_assignments: hackathons
                    .iter()
                    .filter(|h| h.status == HackathonStatus::Ongoing)
                    .count() as u64,
                total_scores: score_counts.get(&j.id).copied().unwrap_or(0) as u64,
                hackathons,
                id: j.id,
                name: j.name,
                email: j.email,
                expertise: j.expertise,
                avatar: j.avatar,
                is_active: j.is_active,
                created_at: j.created_at,
            }
        })
        .collect())
}

async fn single_response<C: ConnectionTrait>(
    db: &C,
    judge: user::Model,
) -> Result<JudgeResponse, AppError> {
    judge_responses(db, vec![judge])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Judge view missing".into()))
}

/// Refuse to deactivate a judge who is assigned to a hackathon that is running now.
async fn ensure_not_judging_now<C: ConnectionTrait>(db: &C, judge_id: i32) -> Result<(), AppError> {
    let now = Utc::now();
    let ongoing = judge_assignment::Entity::find()
        .filter(judge_assignment::Column::JudgeId.eq(judge_id))
        .filter(
            judge_assignment::Column::HackathonId.in_subquery(
                SeaQuery::select()
                    .column(hackathon::Column::Id)
                    .from(hackathon::Entity)
                    .and_where(hackathon::Column::StartTime.lte(now))
                    .and_where(hackathon::Column::EndTime.gte(now))
                    .to_owned(),
            ),
        )
        .count(db)
        .await?;
    if ongoing > 0 {
        return Err(AppError::InvalidState(
            "Cannot deactivate a judge assigned to an ongoing hackathon".into(),
        ));
    }
    Ok(())
}

async fn ensure_email_free<C: ConnectionTrait>(
    db: &C,
    email: &str,
    except_id: Option<i32>,
) -> Result<(), AppError> {
    let mut select = user::Entity::find().filter(user::Column::Email.eq(email));
    if let Some(id) = except_id {
        select = select.filter(user::Column::Id.ne(id));
    }
    if select.one(db).await?.is_some() {
        return Err(AppError::EmailTaken);
    }
    Ok(())
}

fn map_unique_violation(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::EmailTaken,
        _ => AppError::from(e),
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Judges",
    operation_id = "listJudges",
    summary = "List judges",
    description = "Paginated, newest first, with assignment and scoring counts. `search` matches name, email or expertise case-insensitively.",
    params(JudgeListQuery),
    responses(
        (status = 200, description = "Judges", body = JudgeListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_judges(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<JudgeListQuery>,
) -> Result<Json<JudgeListResponse>, AppError> {
    auth_user.require_judge()?;
    let (page, per_page) = page_params(query.page, query.per_page);

    let mut select = user::Entity::find().filter(user::Column::Role.eq(Role::Judge));

    if let Some(is_active) = query.is_active {
        select = select.filter(user::Column::IsActive.eq(is_active));
    }

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            let matches = |col: user::Column| {
                Expr::expr(Func::lower(Expr::col(col)))
                    .like(LikeExpr::new(pattern.clone()).escape('\\'))
            };
            select = select.filter(
                Condition::any()
                    .add(matches(user::Column::Name))
                    .add(matches(user::Column::Email))
                    .add(matches(user::Column::Expertise)),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let judges = select
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    Ok(Json(JudgeListResponse {
        data: judge_responses(&state.db, judges).await?,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Judges",
    operation_id = "createJudge",
    summary = "Create a judge account",
    description = "Creates an active user with the `judge` role. Requires admin.",
    request_body = CreateJudgeRequest,
    responses(
        (status = 201, description = "Judge created", body = JudgeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(email = %payload.email))]
pub async fn create_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateJudgeRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_judge(&payload)?;

    let email = normalize_email(&payload.email);
    ensure_email_free(&state.db, &email, None).await?;

    let password = hash::hash_password_blocking(payload.password)
        .await
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let now = Utc::now();
    let judge = user::ActiveModel {
        email: Set(email),
        name: Set(payload.name.trim().to_string()),
        password: Set(password),
        role: Set(Role::Judge),
        expertise: Set(payload.expertise.map(|e| e.trim().to_string())),
        avatar: Set(payload.avatar),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(map_unique_violation)?;

    tracing::info!(judge_id = judge.id, "Judge created");
    Ok((
        StatusCode::CREATED,
        Json(single_response(&state.db, judge).await?),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Judges",
    operation_id = "getJudge",
    summary = "Get a judge by ID",
    params(("id" = i32, Path, description = "Judge user ID")),
    responses(
        (status = 200, description = "Judge details", body = JudgeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Judge not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<JudgeResponse>, AppError> {
    auth_user.require_judge()?;
    let judge = find_judge(&state.db, id).await?;
    Ok(Json(single_response(&state.db, judge).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Judges",
    operation_id = "updateJudge",
    summary = "Update a judge",
    description = "Partial update. Deactivating via `is_active: false` follows the same rule as delete. Requires admin.",
    params(("id" = i32, Path, description = "Judge user ID")),
    request_body = UpdateJudgeRequest,
    responses(
        (status = 200, description = "Judge updated", body = JudgeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Judge not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateJudgeRequest>,
) -> Result<Json<JudgeResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_judge(&payload)?;

    let existing = find_judge(&state.db, id).await?;
    if payload == UpdateJudgeRequest::default() {
        return Ok(Json(single_response(&state.db, existing).await?));
    }

    if payload.is_active == Some(false) && existing.is_active {
        ensure_not_judging_now(&state.db, id).await?;
    }

    let mut active: user::ActiveModel = existing.into();

    if let Some(ref email) = payload.email {
        let email = normalize_email(email);
        ensure_email_free(&state.db, &email, Some(id)).await?;
        active.email = Set(email);
    }
    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(password) = payload.password {
        let hashed = hash::hash_password_blocking(password)
            .await
            .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;
        active.password = Set(hashed);
    }
    if let Some(expertise) = payload.expertise {
        active.expertise = Set(expertise.map(|e| e.trim().to_string()));
    }
    if let Some(avatar) = payload.avatar {
        active.avatar = Set(avatar);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now());

    let judge = active
        .update(&state.db)
        .await
        .map_err(map_unique_violation)?;

    Ok(Json(single_response(&state.db, judge).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Judges",
    operation_id = "deleteJudge",
    summary = "Deactivate a judge",
    description = "Soft delete: the account is marked inactive so its scores keep their provenance. Refused while the judge is assigned to an ongoing hackathon. Requires admin.",
    params(("id" = i32, Path, description = "Judge user ID")),
    responses(
        (status = 204, description = "Judge deactivated"),
        (status = 400, description = "Judge is assigned to an ongoing hackathon (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Judge not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    let judge = find_judge(&state.db, id).await?;
    ensure_not_judging_now(&state.db, id).await?;

    let mut active: user::ActiveModel = judge.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await?;

    tracing::info!(judge_id = id, "Judge deactivated");
    Ok(StatusCode::NO_CONTENT)
}
