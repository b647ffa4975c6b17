use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::LockType;
use sea_orm::*;

use crate::entity::{hackathon, judge_assignment, prize, project, user};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::models::hackathon::HackathonResponse;
use crate::models::shared::JudgeSummary;

/// Look up a hackathon by ID, returning 404 if not found.
pub async fn find_hackathon<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<hackathon::Model, AppError> {
    hackathon::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))
}

/// Same as [`find_hackathon`] but takes a row lock for the rest of the transaction.
pub async fn find_hackathon_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<hackathon::Model, AppError> {
    hackathon::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))
}

/// Look up a project that has not been soft-deleted.
pub async fn find_active_project<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<project::Model, AppError> {
    project::Entity::find_by_id(id)
        .filter(project::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
}

pub async fn find_active_project_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<project::Model, AppError> {
    project::Entity::find_by_id(id)
        .filter(project::Column::IsActive.eq(true))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
}

/// Admins pass; judges must hold an assignment for the hackathon.
pub async fn require_assignment<C: ConnectionTrait>(
    db: &C,
    auth_user: &AuthUser,
    hackathon_id: i32,
) -> Result<(), AppError> {
    auth_user.require_judge()?;
    if auth_user.is_admin() {
        return Ok(());
    }
    let assigned = judge_assignment::Entity::find_by_id((hackathon_id, auth_user.user_id))
        .one(db)
        .await?
        .is_some();
    if !assigned {
        return Err(AppError::PermissionDenied(
            "You are not assigned to judge this hackathon".into(),
        ));
    }
    Ok(())
}

/// Batch-load users by ID.
pub async fn load_users<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, user::Model>, AppError> {
    let mut ids: Vec<i32> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

/// Identity for a judge referenced by a score row. Falls back to a
/// placeholder when the account row is gone.
pub fn judge_summary(users: &HashMap<i32, user::Model>, judge_id: i32) -> JudgeSummary {
    users.get(&judge_id).map(JudgeSummary::from).unwrap_or_else(|| JudgeSummary {
        id: judge_id,
        name: "Unknown judge".into(),
        email: String::new(),
    })
}

/// Batch-load prizes for several hackathons, ordered by position.
pub async fn load_prizes<C: ConnectionTrait>(
    db: &C,
    hackathon_ids: &[i32],
) -> Result<HashMap<i32, Vec<prize::Model>>, AppError> {
    let mut map: HashMap<i32, Vec<prize::Model>> = HashMap::new();
    if hackathon_ids.is_empty() {
        return Ok(map);
    }
    let prizes = prize::Entity::find()
        .filter(prize::Column::HackathonId.is_in(hackathon_ids.to_vec()))
        .order_by_asc(prize::Column::Position)
        .all(db)
        .await?;
    for p in prizes {
        map.entry(p.hackathon_id).or_default().push(p);
    }
    Ok(map)
}

/// Batch-load assignments for several hackathons together with judge identity.
pub async fn load_assignments<C: ConnectionTrait>(
    db: &C,
    hackathon_ids: &[i32],
) -> Result<HashMap<i32, Vec<(judge_assignment::Model, user::Model)>>, AppError> {
    let mut map: HashMap<i32, Vec<_>> = HashMap::new();
    if hackathon_ids.is_empty() {
        return Ok(map);
    }
    let assignments = judge_assignment::Entity::find()
        .filter(judge_assignment::Column::HackathonId.is_in(hackathon_ids.to_vec()))
        .order_by_asc(judge_assignment::Column::AssignedAt)
        .order_by_asc(judge_assignment::Column::JudgeId)
        .all(db)
        .await?;
    let users = load_users(db, assignments.iter().map(|a| a.judge_id)).await?;
    for a in assignments {
        if let Some(judge) = users.get(&a.judge_id) {
            map.entry(a.hackathon_id)
                .or_default()
                .push((a, judge.clone()));
        }
    }
    Ok(map)
}

/// Build full hackathon views (prizes + judges) for a page of hackathons.
pub async fn hackathon_responses<C: ConnectionTrait>(
    db: &C,
    hackathons: Vec<hackathon::Model>,
    now: DateTime<Utc>,
) -> Result<Vec<HackathonResponse>, AppError> {
    let ids: Vec<i32> = hackathons.iter().map(|h| h.id).collect();
    let mut prizes = load_prizes(db, &ids).await?;
    let mut assignments = load_assignments(db, &ids).await?;

    Ok(hackathons
        .into_iter()
        .map(|h| {
            let judges = assignments
                .remove(&h.id)
                .unwrap_or_default()
                .iter()
                .map(|(_, u)| JudgeSummary::from(u))
                .collect();
            let prizes = prizes.remove(&h.id).unwrap_or_default();
            HackathonResponse::new(h, prizes, judges, now)
        })
        .collect())
}
