use chrono::{DateTime, Utc};
use common::notification::{NotificationPriority, NotificationType};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, double_option, validate_text};
use crate::entity::notification;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateNotificationRequest {
    /// Recipient; omit or null for a global notification.
    pub user_id: Option<i32>,
    #[schema(example = "Judging opens tomorrow")]
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationType,
    #[serde(default)]
    pub priority: NotificationPriority,
    pub action_url: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateNotificationRequest {
    pub is_read: Option<bool>,
    /// Admin only.
    pub title: Option<String>,
    /// Admin only.
    pub message: Option<String>,
    /// Admin only.
    #[serde(rename = "type")]
    pub kind: Option<NotificationType>,
    /// Admin only.
    pub priority: Option<NotificationPriority>,
    /// Admin only.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub action_url: Option<Option<String>>,
}

impl UpdateNotificationRequest {
    /// True when the request touches anything other than `is_read`.
    pub fn edits_content(&self) -> bool {
        self.title.is_some()
            || self.message.is_some()
            || self.kind.is_some()
            || self.priority.is_some()
            || self.action_url.is_some()
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationListQuery {
    pub unread_only: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NotificationResponse {
    pub id: i32,
    pub user_id: Option<i32>,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub priority: NotificationPriority,
    pub action_url: Option<String>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<notification::Model> for NotificationResponse {
    fn from(m: notification::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            title: m.title,
            message: m.message,
            kind: m.kind,
            priority: m.priority,
            action_url: m.action_url,
            is_read: m.is_read,
            read_at: m.read_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NotificationListResponse {
    pub data: Vec<NotificationResponse>,
    pub pagination: Pagination,
    /// Unread notifications visible to the caller, across all pages.
    pub unread_count: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MarkAllReadResponse {
    #[schema(example = 4)]
    pub updated: u64,
}

fn validate_message(message: &str) -> Result<(), AppError> {
    if message.trim().is_empty() || message.chars().count() > 2000 {
        return Err(AppError::Validation(
            "Message must be 1-2000 characters".into(),
        ));
    }
    Ok(())
}

fn validate_action_url(url: &str) -> Result<(), AppError> {
    // Relative in-app paths are allowed alongside absolute URLs.
    let url = url.trim();
    let ok = url.starts_with('/') || url.starts_with("http://") || url.starts_with("https://");
    if !ok || url.len() > 2048 {
        return Err(AppError::Validation(
            "action_url must be a path or an http(s) URL".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_notification(req: &CreateNotificationRequest) -> Result<(), AppError> {
    validate_text("Title", &req.title, 200)?;
    validate_message(&req.message)?;
    if let Some(ref url) = req.action_url {
        validate_action_url(url)?;
    }
    Ok(())
}

pub fn validate_update_notification(req: &UpdateNotificationRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_text("Title", title, 200)?;
    }
    if let Some(ref message) = req.message {
        validate_message(message)?;
    }
    if let Some(Some(ref url)) = req.action_url {
        validate_action_url(url)?;
    }
    Ok(())
}
