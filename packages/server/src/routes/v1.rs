use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{auth, dashboard, hackathon, judge, leaderboard, notification, project, score};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/hackathons", hackathon_routes())
        .nest("/judges", judge_routes())
        .nest("/projects", project_routes())
        .nest("/leaderboard", leaderboard_routes())
        .nest("/dashboard", dashboard_routes())
        .nest("/notifications", notification_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
        .routes(routes!(auth::logout))
        .routes(routes!(auth::me))
}

fn hackathon_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(hackathon::list_hackathons, hackathon::create_hackathon))
        .routes(routes!(
            hackathon::get_hackathon,
            hackathon::update_hackathon,
            hackathon::delete_hackathon
        ))
        .routes(routes!(
            hackathon::list_judges,
            hackathon::assign_judges,
            hackathon::remove_judges
        ))
}

fn judge_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(judge::list_judges, judge::create_judge))
        .routes(routes!(
            judge::get_judge,
            judge::update_judge,
            judge::delete_judge
        ))
}

fn project_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(project::list_projects, project::submit_project))
        .routes(routes!(
            project::get_project,
            project::update_project,
            project::delete_project
        ))
        .routes(routes!(
            score::list_scores,
            score::submit_score,
            score::replace_score
        ))
}

fn leaderboard_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(leaderboard::get_leaderboard))
}

fn dashboard_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(dashboard::get_stats))
}

fn notification_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            notification::list_notifications,
            notification::create_notification
        ))
        .routes(routes!(notification::mark_all_read))
        .routes(routes!(
            notification::get_notification,
            notification::update_notification,
            notification::delete_notification
        ))
}
