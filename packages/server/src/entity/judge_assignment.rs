use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "judge_assignment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub hackathon_id: i32,
    #[sea_orm(primary_key)]
    pub judge_id: i32,
    #[sea_orm(belongs_to, from = "hackathon_id", to = "id")]
    pub hackathon: HasOne<super::hackathon::Entity>,
    #[sea_orm(belongs_to, from = "judge_id", to = "id")]
    pub judge: HasOne<super::user::Entity>,

    /// Admin who made the assignment.
    pub assigned_by: i32,
    pub assigned_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
