use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use common::HackathonStatus;
use common::rubric::ScoreSheet;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;

use crate::entity::project_score;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::score::{ScoreResponse, SubmitScoreRequest, validate_score};
use crate::state::AppState;
use crate::utils::hackathon::{
    find_active_project, find_hackathon, judge_summary, load_users, require_assignment,
};

/// Validate, authorise and upsert one judge's sheet for a project.
///
/// Returns 201 when the (project, judge) row is new and 200 when it replaced
/// an earlier sheet.
async fn record_score(
    auth_user: AuthUser,
    state: AppState,
    project_id: i32,
    payload: SubmitScoreRequest,
) -> Result<(StatusCode, Json<ScoreResponse>), AppError> {
    auth_user.require_judge()?;
    let (scores, comments) = validate_score(&payload)?;

    let project = find_active_project(&state.db, project_id).await?;
    let hackathon = find_hackathon(&state.db, project.hackathon_id).await?;
    let now = Utc::now();
    if !HackathonStatus::at(hackathon.start_time, hackathon.end_time, now).accepts_scores() {
        return Err(AppError::InvalidState(
            "Judging has not started for this hackathon".into(),
        ));
    }
    require_assignment(&state.db, &auth_user, hackathon.id).await?;

    let judge_id = auth_user.user_id;
    let txn = state.db.begin().await?;

    let mut row = project_score::ActiveModel {
        project_id: Set(project_id),
        judge_id: Set(judge_id),
        innovation: Set(scores.innovation()),
        design: Set(scores.design()),
        functionality: Set(scores.functionality()),
        presentation: Set(scores.presentation()),
        total_score: Set(scores.total()),
        comments: Set(comments),
        scored_at: Set(now),
        updated_at: Set(now),
    };

    // A concurrent first submission blocks on the key until it commits, so
    // exactly one caller sees the insert land.
    let inserted = project_score::Entity::insert(row.clone())
        .on_conflict(
            OnConflict::columns([
                project_score::Column::ProjectId,
                project_score::Column::JudgeId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?
        == 1;

    let saved = if inserted {
        project_score::Entity::find_by_id((project_id, judge_id))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::Internal("Score row missing after insert".into()))?
    } else {
        // scored_at keeps the first submission time; everything else is replaced.
        row.scored_at = NotSet;
        row.update(&txn).await?
    };
    txn.commit().await?;

    tracing::info!(
        project_id,
        judge_id,
        total = saved.total_score,
        updated = !inserted,
        "Score recorded"
    );

    let users = load_users(&state.db, [judge_id]).await?;
    let status = if inserted {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ScoreResponse::new(saved, judge_summary(&users, judge_id))),
    ))
}

#[utoipa::path(
    post,
    path = "/{id}/scores",
    tag = "Scores",
    operation_id = "submitScore",
    summary = "Submit or replace a score",
    description = "Records the caller's sheet for the project. Each criterion is an integer from 1 to 10 and `total_score` is their sum. A judge has at most one sheet per project: re-submitting replaces it and returns 200. Judges must be assigned to the project's hackathon; admins may score any project. Rejected before the hackathon starts.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = SubmitScoreRequest,
    responses(
        (status = 201, description = "Score created", body = ScoreResponse),
        (status = 200, description = "Existing score replaced", body = ScoreResponse),
        (status = 400, description = "Score out of range or not an integer (VALIDATION_ERROR), hackathon not started (INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not assigned to this hackathon (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(project_id = id, judge_id = auth_user.user_id))]
pub async fn submit_score(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SubmitScoreRequest>,
) -> Result<(StatusCode, Json<ScoreResponse>), AppError> {
    record_score(auth_user, state, id, payload).await
}

#[utoipa::path(
    put,
    path = "/{id}/scores",
    tag = "Scores",
    operation_id = "replaceScore",
    summary = "Submit or replace a score (alias)",
    description = "Same behaviour as `POST /projects/{id}/scores`.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = SubmitScoreRequest,
    responses(
        (status = 201, description = "Score created", body = ScoreResponse),
        (status = 200, description = "Existing score replaced", body = ScoreResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, INVALID_STATE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(project_id = id, judge_id = auth_user.user_id))]
pub async fn replace_score(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SubmitScoreRequest>,
) -> Result<(StatusCode, Json<ScoreResponse>), AppError> {
    record_score(auth_user, state, id, payload).await
}

#[utoipa::path(
    get,
    path = "/{id}/scores",
    tag = "Scores",
    operation_id = "listScores",
    summary = "List a project's scores",
    description = "Every judge's sheet for the project with judge identity, newest first.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Scores", body = Vec<ScoreResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(project_id = id))]
pub async fn list_scores(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ScoreResponse>>, AppError> {
    auth_user.require_judge()?;
    find_active_project(&state.db, id).await?;

    let scores = project_score::Entity::find()
        .filter(project_score::Column::ProjectId.eq(id))
        .order_by_desc(project_score::Column::ScoredAt)
        .order_by_asc(project_score::Column::JudgeId)
        .all(&state.db)
        .await?;
    let users = load_users(&state.db, scores.iter().map(|s| s.judge_id)).await?;

    Ok(Json(
        scores
            .into_iter()
            .map(|s| {
                let judge = judge_summary(&users, s.judge_id);
                ScoreResponse::new(s, judge)
            })
            .collect(),
    ))
}
