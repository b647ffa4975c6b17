use chrono::{DateTime, Utc};
use common::HackathonStatus;
use serde::{Deserialize, Serialize};

use super::auth::{validate_email, validate_password};
use super::shared::{Pagination, double_option, validate_optional_url, validate_text};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateJudgeRequest {
    #[schema(example = "Grace Hopper")]
    pub name: String,
    #[schema(example = "grace@example.com")]
    pub email: String,
    pub password: String,
    #[schema(example = "Compilers")]
    pub expertise: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateJudgeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub expertise: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub avatar: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JudgeListQuery {
    /// Case-insensitive match on name, email or expertise.
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Hackathon a judge is assigned to.
#[derive(Serialize, utoipa::ToSchema)]
pub struct JudgeHackathon {
    pub id: i32,
    pub name: String,
    pub status: HackathonStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JudgeResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub expertise: Option<String>,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[schema(example = 3)]
    pub total_assignments: u64,
    /// Assignments to hackathons that are currently ongoing.
    #[schema(example = 1)]
    pub active_assignments: u64,
    #[schema(example = 12)]
    pub total_scores: u64,
    pub hackathons: Vec<JudgeHackathon>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JudgeListResponse {
    pub data: Vec<JudgeResponse>,
    pub pagination: Pagination,
}

fn validate_expertise(expertise: Option<&str>) -> Result<(), AppError> {
    if let Some(expertise) = expertise
        && expertise.chars().count() > 200
    {
        return Err(AppError::Validation(
            "Expertise must be at most 200 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_judge(req: &CreateJudgeRequest) -> Result<(), AppError> {
    validate_text("Name", &req.name, 100)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    validate_expertise(req.expertise.as_deref())?;
    validate_optional_url("Avatar", req.avatar.as_deref())
}

pub fn validate_update_judge(req: &UpdateJudgeRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_text("Name", name, 100)?;
    }
    if let Some(ref email) = req.email {
        validate_email(email)?;
    }
    if let Some(ref password) = req.password {
        validate_password(password)?;
    }
    if let Some(ref expertise) = req.expertise {
        validate_expertise(expertise.as_deref())?;
    }
    if let Some(ref avatar) = req.avatar {
        validate_optional_url("Avatar", avatar.as_deref())?;
    }
    Ok(())
}
