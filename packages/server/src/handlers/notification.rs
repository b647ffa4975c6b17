use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{notification, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::notification::*;
use crate::models::shared::{Pagination, page_params};
use crate::state::AppState;

/// Notifications addressed to the user plus global ones.
fn visible_to(user_id: i32) -> Condition {
    Condition::any()
        .add(notification::Column::UserId.eq(user_id))
        .add(notification::Column::UserId.is_null())
}

/// Admins can reach any notification; others only what is visible to them.
/// Hidden notifications are reported as missing.
async fn find_accessible(
    db: &DatabaseConnection,
    auth_user: &AuthUser,
    id: i32,
) -> Result<notification::Model, AppError> {
    let mut select = notification::Entity::find_by_id(id);
    if !auth_user.is_admin() {
        select = select.filter(visible_to(auth_user.user_id));
    }
    select
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".into()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Notifications",
    operation_id = "listNotifications",
    summary = "List the caller's notifications",
    description = "The caller's own notifications plus global ones, newest first.",
    params(NotificationListQuery),
    responses(
        (status = 200, description = "Notifications", body = NotificationListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_notifications(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let (page, per_page) = page_params(query.page, query.per_page);

    let visible = notification::Entity::find().filter(visible_to(auth_user.user_id));
    let unread = visible
        .clone()
        .filter(notification::Column::IsRead.eq(false));

    let unread_count = unread.clone().count(&state.db).await?;
    let select = if query.unread_only.unwrap_or(false) {
        unread
    } else {
        visible
    };

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let data = select
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(NotificationResponse::from)
        .collect();

    Ok(Json(NotificationListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
        unread_count,
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Notifications",
    operation_id = "createNotification",
    summary = "Create a notification",
    description = "Sends a notification to one user, or to everyone when `user_id` is omitted. Requires admin.",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created", body = NotificationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Recipient not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(recipient = ?payload.user_id))]
pub async fn create_notification(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateNotificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_notification(&payload)?;

    if let Some(user_id) = payload.user_id {
        user::Entity::find_by_id(user_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    }

    let now = Utc::now();
    let model = notification::ActiveModel {
        user_id: Set(payload.user_id),
        title: Set(payload.title.trim().to_string()),
        message: Set(payload.message),
        kind: Set(payload.kind),
        priority: Set(payload.priority),
        action_url: Set(payload.action_url),
        is_read: Set(false),
        read_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(NotificationResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Notifications",
    operation_id = "getNotification",
    summary = "Get a notification",
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification", body = NotificationResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Notification not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_notification(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<NotificationResponse>, AppError> {
    let model = find_accessible(&state.db, &auth_user, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Notifications",
    operation_id = "updateNotification",
    summary = "Update a notification",
    description = "Anyone who can see a notification may toggle `is_read`. Changing any other field requires admin.",
    params(("id" = i32, Path, description = "Notification ID")),
    request_body = UpdateNotificationRequest,
    responses(
        (status = 200, description = "Notification updated", body = NotificationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Content edits require admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Notification not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_notification(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateNotificationRequest>,
) -> Result<Json<NotificationResponse>, AppError> {
    if payload.edits_content() {
        auth_user.require_admin()?;
    }
    validate_update_notification(&payload)?;

    let existing = find_accessible(&state.db, &auth_user, id).await?;
    if payload == UpdateNotificationRequest::default() {
        return Ok(Json(existing.into()));
    }

    let now = Utc::now();
    let mut active: notification::ActiveModel = existing.into();

    if let Some(is_read) = payload.is_read {
        active.is_read = Set(is_read);
        active.read_at = Set(is_read.then_some(now));
    }
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(message) = payload.message {
        active.message = Set(message);
    }
    if let Some(kind) = payload.kind {
        active.kind = Set(kind);
    }
    if let Some(priority) = payload.priority {
        active.priority = Set(priority);
    }
    if let Some(action_url) = payload.action_url {
        active.action_url = Set(action_url);
    }
    active.updated_at = Set(now);

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Notifications",
    operation_id = "deleteNotification",
    summary = "Delete a notification",
    description = "Requires admin.",
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Notification not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_notification(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    let result = notification::Entity::delete_by_id(id)
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Notification not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/mark-all-read",
    tag = "Notifications",
    operation_id = "markAllNotificationsRead",
    summary = "Mark every visible notification as read",
    description = "Marks the caller's unread notifications, global ones included, as read.",
    responses(
        (status = 200, description = "Notifications marked", body = MarkAllReadResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn mark_all_read(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MarkAllReadResponse>, AppError> {
    let now = Utc::now();
    let result = notification::Entity::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .col_expr(notification::Column::ReadAt, Expr::value(Some(now)))
        .col_expr(notification::Column::UpdatedAt, Expr::value(now))
        .filter(visible_to(auth_user.user_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(&state.db)
        .await?;

    tracing::info!(
        user_id = auth_user.user_id,
        updated = result.rows_affected,
        "Marked notifications read"
    );
    Ok(Json(MarkAllReadResponse {
        updated: result.rows_affected,
    }))
}
