use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub hackathon_id: i32,
    #[sea_orm(belongs_to, from = "hackathon_id", to = "id")]
    pub hackathon: HasOne<super::hackathon::Entity>,

    pub team_name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub github_link: String,
    pub demo_link: Option<String>,
    #[sea_orm(default_value = 1)]
    pub team_size: i32,

    /// Technology tags stored as a JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub technologies: serde_json::Value,

    /// Soft-delete flag. Inactive projects are hidden and cannot be scored.
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    #[sea_orm(has_many)]
    pub scores: HasMany<super::project_score::Entity>,

    pub submitted_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
