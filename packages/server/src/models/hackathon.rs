use chrono::{DateTime, Utc};
use common::HackathonStatus;
use serde::{Deserialize, Serialize};

use super::shared::{
    JudgeSummary, Pagination, double_option, validate_bulk_ids, validate_optional_url,
    validate_text,
};
use crate::entity::{hackathon, prize};
use crate::error::AppError;

/// Upper bound on judges in a single assignment request.
pub const MAX_JUDGES_PER_REQUEST: usize = 200;

const MAX_PRIZES: usize = 50;

#[derive(Clone, Debug, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct PrizeInput {
    #[schema(example = "Grand Prize")]
    pub title: String,
    /// Non-negative amount in major currency units.
    #[schema(example = 1000.0)]
    pub amount: f64,
    /// ISO currency code; defaults to `USD`.
    #[schema(example = "USD")]
    pub currency: Option<String>,
    /// Number of winning teams; defaults to 1.
    #[schema(example = 1)]
    pub winners: Option<i32>,
}

impl PrizeInput {
    pub fn amount_cents(&self) -> i64 {
        (self.amount * 100.0).round() as i64
    }

    pub fn currency_code(&self) -> String {
        self.currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| "USD".into())
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateHackathonRequest {
    #[schema(example = "Spring Hack 2025")]
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub rules: String,
    pub banner: Option<String>,
    /// Maximum team size; defaults to 5.
    #[schema(example = 5)]
    pub team_size_limit: Option<i32>,
    /// Prizes in award order; `position` is assigned from the index.
    #[serde(default)]
    pub prizes: Vec<PrizeInput>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateHackathonRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub rules: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub banner: Option<Option<String>>,
    pub team_size_limit: Option<i32>,
    /// When present, replaces every existing prize.
    pub prizes: Option<Vec<PrizeInput>>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HackathonListQuery {
    /// Filter by derived lifecycle status.
    pub status: Option<HackathonStatus>,
    /// Page number (1-based, default 1).
    pub page: Option<u64>,
    /// Items per page (1-100, default 20).
    pub per_page: Option<u64>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct JudgeIdsRequest {
    #[schema(example = json!([3, 7]))]
    pub judge_ids: Vec<i32>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct PrizeResponse {
    pub id: i32,
    pub title: String,
    #[schema(example = 1000.0)]
    pub amount: f64,
    #[schema(example = "USD")]
    pub currency: String,
    pub winners: i32,
    #[schema(example = 1)]
    pub position: i32,
}

impl From<prize::Model> for PrizeResponse {
    fn from(m: prize::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            amount: m.amount_cents as f64 / 100.0,
            currency: m.currency,
            winners: m.winners,
            position: m.position,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub rules: String,
    pub banner: Option<String>,
    pub team_size_limit: i32,
    pub total_participants: i32,
    pub total_projects: i32,
    /// Derived from the current time; never stored.
    pub status: HackathonStatus,
    pub created_by: i32,
    pub prizes: Vec<PrizeResponse>,
    pub judges: Vec<JudgeSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HackathonResponse {
    pub fn new(
        m: hackathon::Model,
        prizes: Vec<prize::Model>,
        judges: Vec<JudgeSummary>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            status: HackathonStatus::at(m.start_time, m.end_time, now),
            id: m.id,
            name: m.name,
            description: m.description,
            start_time: m.start_time,
            end_time: m.end_time,
            rules: m.rules,
            banner: m.banner,
            team_size_limit: m.team_size_limit,
            total_participants: m.total_participants,
            total_projects: m.total_projects,
            created_by: m.created_by,
            prizes: prizes.into_iter().map(PrizeResponse::from).collect(),
            judges,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonListResponse {
    pub data: Vec<HackathonResponse>,
    pub pagination: Pagination,
}

/// A judge assigned to a hackathon.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AssignedJudgeResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub expertise: Option<String>,
    pub avatar: Option<String>,
    pub assigned_by: i32,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RemoveJudgesResponse {
    /// Number of assignments actually deleted.
    #[schema(example = 2)]
    pub removed: u64,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_time_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::Validation(
            "end_time must be after start_time".into(),
        ));
    }
    Ok(())
}

fn validate_team_size_limit(limit: i32) -> Result<(), AppError> {
    if !(1..=100).contains(&limit) {
        return Err(AppError::Validation(
            "team_size_limit must be between 1 and 100".into(),
        ));
    }
    Ok(())
}

fn validate_long_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() || value.len() > 100_000 {
        return Err(AppError::Validation(format!(
            "{field} must be non-empty and at most 100KB"
        )));
    }
    Ok(())
}

pub fn validate_prizes(prizes: &[PrizeInput]) -> Result<(), AppError> {
    if prizes.len() > MAX_PRIZES {
        return Err(AppError::Validation(format!(
            "Too many prizes: max {MAX_PRIZES}"
        )));
    }
    for (index, prize) in prizes.iter().enumerate() {
        let place = index + 1;
        validate_text(&format!("Prize {place} title"), &prize.title, 200)?;
        if !prize.amount.is_finite() || prize.amount < 0.0 {
            return Err(AppError::Validation(format!(
                "Prize {place} amount must be a non-negative number"
            )));
        }
        if let Some(ref currency) = prize.currency {
            let code = currency.trim();
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(AppError::Validation(format!(
                    "Prize {place} currency must be a 3-letter code"
                )));
            }
        }
        if let Some(winners) = prize.winners
            && winners < 1
        {
            return Err(AppError::Validation(format!(
                "Prize {place} winners must be at least 1"
            )));
        }
    }
    Ok(())
}

pub fn validate_create_hackathon(req: &CreateHackathonRequest) -> Result<(), AppError> {
    validate_text("Name", &req.name, 200)?;
    validate_long_text("Description", &req.description)?;
    validate_long_text("Rules", &req.rules)?;
    validate_time_window(req.start_time, req.end_time)?;
    validate_optional_url("Banner", req.banner.as_deref())?;
    if let Some(limit) = req.team_size_limit {
        validate_team_size_limit(limit)?;
    }
    validate_prizes(&req.prizes)
}

/// Field-level checks only; the handler re-checks the time window against
/// the stored values when just one bound changes.
pub fn validate_update_hackathon(req: &UpdateHackathonRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_text("Name", name, 200)?;
    }
    if let Some(ref description) = req.description {
        validate_long_text("Description", description)?;
    }
    if let Some(ref rules) = req.rules {
        validate_long_text("Rules", rules)?;
    }
    if let (Some(start), Some(end)) = (req.start_time, req.end_time) {
        validate_time_window(start, end)?;
    }
    if let Some(Some(ref banner)) = req.banner {
        validate_optional_url("Banner", Some(banner))?;
    }
    if let Some(limit) = req.team_size_limit {
        validate_team_size_limit(limit)?;
    }
    if let Some(ref prizes) = req.prizes {
        validate_prizes(prizes)?;
    }
    Ok(())
}

pub fn validate_judge_ids(req: &JudgeIdsRequest) -> Result<(), AppError> {
    validate_bulk_ids(&req.judge_ids, "judge", MAX_JUDGES_PER_REQUEST)
}
