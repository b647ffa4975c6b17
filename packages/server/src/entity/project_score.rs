use common::rubric::{Criterion, ScoreSheet};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One judge's score sheet for one project.
///
/// The composite primary key is what guarantees a single row per
/// (project, judge); re-submissions upsert onto it.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_score")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub project_id: i32,
    #[sea_orm(primary_key)]
    pub judge_id: i32,
    #[sea_orm(belongs_to, from = "project_id", to = "id")]
    pub project: HasOne<super::project::Entity>,
    #[sea_orm(belongs_to, from = "judge_id", to = "id")]
    pub judge: HasOne<super::user::Entity>,

    pub innovation: i32,
    pub design: i32,
    pub functionality: i32,
    pub presentation: i32,
    /// Sum of the four criteria, written in the same statement as them.
    pub total_score: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub comments: Option<String>,

    pub scored_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl ScoreSheet for Model {
    fn criterion(&self, criterion: Criterion) -> i32 {
        match criterion {
            Criterion::Innovation => self.innovation,
            Criterion::Design => self.design,
            Criterion::Functionality => self.functionality,
            Criterion::Presentation => self.presentation,
        }
    }

    fn total(&self) -> i32 {
        self.total_score
    }
}
