#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of an account.
///
/// `Admin` implicitly satisfies every judge-level check.
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages hackathons, judges, projects and notifications.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "admin"))]
    Admin,
    /// Scores projects of the hackathons they are assigned to.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "judge"))]
    Judge,
}

impl Role {
    pub const ALL: &'static [Role] = &[Self::Admin, Self::Judge];

    /// Returns true if this role passes a check that requires `required`.
    pub fn satisfies(&self, required: Role) -> bool {
        *self == Self::Admin || *self == required
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Judge => "judge",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Judge
    }
}

/// Error when parsing an invalid role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid role '{invalid}'. Valid values: admin, judge")]
pub struct ParseRoleError {
    invalid: String,
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "judge" => Ok(Self::Judge),
            _ => Err(ParseRoleError {
                invalid: s.to_string(),
            }),
        }
    }
}
