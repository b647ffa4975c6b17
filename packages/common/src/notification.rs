#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};

/// Category of a notification, used by clients to pick an icon and colour.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "info"))]
    Info,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "success"))]
    Success,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "warning"))]
    Warning,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "error"))]
    Error,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "announcement"))]
    Announcement,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "low"))]
    Low,
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "medium"))]
    Medium,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "high"))]
    High,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "urgent"))]
    Urgent,
}
