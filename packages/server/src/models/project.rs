use chrono::{DateTime, Utc};
use common::{HackathonStatus, ScoreAggregate};
use serde::{Deserialize, Serialize};

use super::score::ScoreResponse;
use super::shared::{Pagination, double_option, validate_optional_url, validate_text};
use crate::entity::project;
use crate::error::AppError;

const MAX_TECHNOLOGIES: usize = 30;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitProjectRequest {
    pub hackathon_id: i32,
    #[schema(example = "Null Pointers")]
    pub team_name: String,
    pub description: String,
    #[schema(example = "https://github.com/null-pointers/voting-app")]
    pub github_link: String,
    pub demo_link: Option<String>,
    /// Defaults to 1; must not exceed the hackathon's team size limit.
    #[schema(example = 3)]
    pub team_size: Option<i32>,
    #[serde(default)]
    #[schema(example = json!(["rust", "postgres"]))]
    pub technologies: Vec<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateProjectRequest {
    pub team_name: Option<String>,
    pub description: Option<String>,
    pub github_link: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub demo_link: Option<Option<String>>,
    pub team_size: Option<i32>,
    pub technologies: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectListQuery {
    pub hackathon_id: Option<i32>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Project with its judging summary.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectListItem {
    pub id: i32,
    pub hackathon_id: i32,
    pub team_name: String,
    pub description: String,
    pub github_link: String,
    pub demo_link: Option<String>,
    pub team_size: i32,
    pub technologies: Vec<String>,
    pub submitted_at: DateTime<Utc>,
    #[schema(example = 27.0)]
    pub average_score: f64,
    #[schema(example = 2)]
    pub total_scores: u32,
}

impl ProjectListItem {
    pub fn new(m: project::Model, aggregate: &ScoreAggregate) -> Self {
        Self {
            technologies: technologies_of(&m),
            id: m.id,
            hackathon_id: m.hackathon_id,
            team_name: m.team_name,
            description: m.description,
            github_link: m.github_link,
            demo_link: m.demo_link,
            team_size: m.team_size,
            submitted_at: m.submitted_at,
            average_score: aggregate.average_score,
            total_scores: aggregate.total_scores,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectListResponse {
    pub data: Vec<ProjectListItem>,
    pub pagination: Pagination,
}

/// Returned by the public submission endpoint.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmittedProjectResponse {
    pub id: i32,
    pub hackathon_id: i32,
    pub team_name: String,
    pub github_link: String,
    pub demo_link: Option<String>,
    pub team_size: i32,
    pub technologies: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

impl From<project::Model> for SubmittedProjectResponse {
    fn from(m: project::Model) -> Self {
        Self {
            technologies: technologies_of(&m),
            id: m.id,
            hackathon_id: m.hackathon_id,
            team_name: m.team_name,
            github_link: m.github_link,
            demo_link: m.demo_link,
            team_size: m.team_size,
            submitted_at: m.submitted_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectHackathon {
    pub id: i32,
    pub name: String,
    pub status: HackathonStatus,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectDetailResponse {
    pub id: i32,
    pub hackathon: ProjectHackathon,
    pub team_name: String,
    pub description: String,
    pub github_link: String,
    pub demo_link: Option<String>,
    pub team_size: i32,
    pub technologies: Vec<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub aggregate: ScoreAggregate,
    pub scores: Vec<ScoreResponse>,
}

/// Decode the stored technology list, tolerating anything that isn't a string array.
pub fn technologies_of(m: &project::Model) -> Vec<String> {
    serde_json::from_value(m.technologies.clone()).unwrap_or_default()
}

/// Trim, drop blanks, and de-duplicate technology tags preserving order.
pub fn normalize_technologies(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tech in raw.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !out.iter().any(|t| t.eq_ignore_ascii_case(tech)) {
            out.push(tech.to_owned());
        }
    }
    out
}

/// Accepts `https://github.com/<owner>/<repo>` optionally followed by a deeper path.
pub fn validate_github_link(link: &str) -> Result<(), AppError> {
    let segment_char = |c: char| c.is_alphanumeric() || c == '_' || c == '-' || c == '.';
    let valid = link
        .trim()
        .strip_prefix("https://github.com/")
        .and_then(|rest| rest.split_once('/'))
        .is_some_and(|(owner, repo)| {
            !owner.is_empty()
                && owner.chars().all(segment_char)
                && repo.chars().next().is_some_and(segment_char)
        });
    if !valid {
        return Err(AppError::Validation(
            "github_link must look like https://github.com/<owner>/<repo>".into(),
        ));
    }
    Ok(())
}

fn validate_technologies(raw: &[String]) -> Result<(), AppError> {
    if raw.len() > MAX_TECHNOLOGIES {
        return Err(AppError::Validation(format!(
            "Too many technologies: max {MAX_TECHNOLOGIES}"
        )));
    }
    if raw.iter().any(|t| t.trim().chars().count() > 50) {
        return Err(AppError::Validation(
            "Each technology must be at most 50 characters".into(),
        ));
    }
    Ok(())
}

fn validate_team_size(size: i32) -> Result<(), AppError> {
    if size < 1 {
        return Err(AppError::Validation("team_size must be at least 1".into()));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.trim().is_empty() || description.len() > 100_000 {
        return Err(AppError::Validation(
            "Description must be non-empty and at most 100KB".into(),
        ));
    }
    Ok(())
}

pub fn validate_submit_project(req: &SubmitProjectRequest) -> Result<(), AppError> {
    validate_text("Team name", &req.team_name, 100)?;
    validate_description(&req.description)?;
    validate_github_link(&req.github_link)?;
    validate_optional_url("Demo link", req.demo_link.as_deref())?;
    if let Some(size) = req.team_size {
        validate_team_size(size)?;
    }
    validate_technologies(&req.technologies)
}

pub fn validate_update_project(req: &UpdateProjectRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.team_name {
        validate_text("Team name", name, 100)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    if let Some(ref link) = req.github_link {
        validate_github_link(link)?;
    }
    if let Some(Some(ref demo)) = req.demo_link {
        validate_optional_url("Demo link", Some(demo))?;
    }
    if let Some(size) = req.team_size {
        validate_team_size(size)?;
    }
    if let Some(ref technologies) = req.technologies {
        validate_technologies(technologies)?;
    }
    Ok(())
}
