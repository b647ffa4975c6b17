use chrono::Utc;
use common::Role;
use sea_orm::sea_query::{Index, IndexCreateStatement, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::BootstrapConfig;
use crate::entity::{notification, project, project_score, user};
use crate::utils::hash;

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Leaderboard and listing: active projects of one hackathon.
    let project_active = Index::create()
        .if_not_exists()
        .name("idx_project_hackathon_active")
        .table(project::Entity)
        .col(project::Column::HackathonId)
        .col(project::Column::IsActive)
        .to_owned();

    // Judge stats: scores by judge. The primary key leads with project_id.
    let score_judge = Index::create()
        .if_not_exists()
        .name("idx_project_score_judge")
        .table(project_score::Entity)
        .col(project_score::Column::JudgeId)
        .to_owned();

    // Inbox listing and unread counts.
    let notification_inbox = Index::create()
        .if_not_exists()
        .name("idx_notification_user_read")
        .table(notification::Entity)
        .col(notification::Column::UserId)
        .col(notification::Column::IsRead)
        .to_owned();

    for (name, stmt) in [
        ("idx_project_hackathon_active", project_active),
        ("idx_project_score_judge", score_judge),
        ("idx_notification_user_read", notification_inbox),
    ] {
        create_index(db, name, &stmt).await;
    }

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: &IndexCreateStatement) {
    let sql = stmt.to_string(PostgresQueryBuilder);
    match db.execute_unprepared(&sql).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
    }
}

/// Create the bootstrap admin account if one is configured and its email is unused.
pub async fn seed_admin(db: &DatabaseConnection, config: &BootstrapConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    let email = email.trim().to_lowercase();
    let password = hash::hash_password(password)?;
    let now = Utc::now();

    let model = user::ActiveModel {
        email: Set(email.clone()),
        name: Set(config.admin_name.clone()),
        password: Set(password),
        role: Set(Role::Admin),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(OnConflict::column(user::Column::Email).do_nothing().to_owned())
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => {}
        Ok(_) => info!(email = %email, "Seeded bootstrap admin"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
