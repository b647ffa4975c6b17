use common::notification::{NotificationPriority, NotificationType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Recipient. NULL for global notifications shown to everyone.
    #[sea_orm(indexed)]
    pub user_id: Option<i32>,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    #[sea_orm(column_name = "type")]
    pub kind: NotificationType,
    pub priority: NotificationPriority,
    pub action_url: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_read: bool,
    pub read_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
