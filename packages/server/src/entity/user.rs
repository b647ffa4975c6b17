use common::Role;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Always stored lower-cased.
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    pub expertise: Option<String>,
    pub avatar: Option<String>,

    /// Deactivated accounts keep their scores and assignments for provenance.
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    #[sea_orm(has_many)]
    pub scores: HasMany<super::project_score::Entity>,

    #[sea_orm(has_many)]
    pub assignments: HasMany<super::judge_assignment::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
