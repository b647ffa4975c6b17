use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hackathon")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
    #[sea_orm(column_type = "Text")]
    pub rules: String,
    pub banner: Option<String>,
    #[sea_orm(default_value = 5)]
    pub team_size_limit: i32,

    /// Sum of `team_size` over active projects.
    #[sea_orm(default_value = 0)]
    pub total_participants: i32,
    /// Number of active projects.
    #[sea_orm(default_value = 0)]
    pub total_projects: i32,

    /// Admin who created the hackathon.
    pub created_by: i32,

    #[sea_orm(has_many)]
    pub prizes: HasMany<super::prize::Entity>,

    #[sea_orm(has_many)]
    pub projects: HasMany<super::project::Entity>,

    #[sea_orm(has_many)]
    pub assignments: HasMany<super::judge_assignment::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
