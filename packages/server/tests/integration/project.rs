use serde_json::json;

use crate::common::{TestApp, Window, routes};

mod submit_project {
    use super::*;

    #[tokio::test]
    async fn submission_updates_hackathon_counters() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Ongoing)
            .await;

        app.submit_project(id, "Team A").await;
        app.submit_project(id, "Team B").await;

        let res = app.get_without_token(&routes::hackathon(id)).await;
        assert_eq!(res.body["total_projects"], 2);
        assert_eq!(res.body["total_participants"], 4);
    }

    #[tokio::test]
    async fn technologies_are_trimmed_and_deduplicated() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Upcoming)
            .await;

        let res = app
            .post_without_token(
                routes::PROJECTS,
                &json!({
                    "hackathon_id": id,
                    "team_name": "Team A",
                    "description": "Early bird.",
                    "github_link": "https://github.com/team-a/app",
                    "technologies": [" Rust ", "rust", "", "Postgres"],
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["team_size"], 1);
        assert_eq!(res.body["technologies"], json!(["Rust", "Postgres"]));
    }

    #[tokio::test]
    async fn submissions_close_when_hackathon_ends() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Completed)
            .await;

        let res = app
            .post_without_token(
                routes::PROJECTS,
                &json!({
                    "hackathon_id": id,
                    "team_name": "Late",
                    "description": "Too late.",
                    "github_link": "https://github.com/late/app",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn team_larger_than_limit_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Ongoing)
            .await;

        let res = app
            .post_without_token(
                routes::PROJECTS,
                &json!({
                    "hackathon_id": id,
                    "team_name": "Crowd",
                    "description": "Everyone.",
                    "github_link": "https://github.com/crowd/app",
                    "team_size": 5,
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn empty_team_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Ongoing)
            .await;

        let res = app
            .post_without_token(
                routes::PROJECTS,
                &json!({
                    "hackathon_id": id,
                    "team_name": "Nobody",
                    "description": "No one.",
                    "github_link": "https://github.com/nobody/app",
                    "team_size": 0,
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn non_github_link_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Ongoing)
            .await;

        let res = app
            .post_without_token(
                routes::PROJECTS,
                &json!({
                    "hackathon_id": id,
                    "team_name": "Team A",
                    "description": "Hosted elsewhere.",
                    "github_link": "https://gitlab.com/team-a/app",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod view_projects {
    use super::*;

    #[tokio::test]
    async fn list_shows_average_and_score_count() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Ongoing)
            .await;
        let project = app.submit_project(id, "Team A").await;
        let res = app.score(project, [7, 6, 8, 6], &admin.token).await;
        assert_eq!(res.status, 201, "{}", res.text);

        let res = app
            .get_with_token(
                &format!("{}?hackathon_id={id}", routes::PROJECTS),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["average_score"], 27.0);
        assert_eq!(data[0]["total_scores"], 1);
    }

    #[tokio::test]
    async fn anonymous_caller_cannot_list_projects() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::PROJECTS).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}

mod update_and_withdraw {
    use super::*;

    #[tokio::test]
    async fn team_size_change_moves_participant_counter() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Ongoing)
            .await;
        let project = app.submit_project(id, "Team A").await;

        let res = app
            .patch_with_token(
                &routes::project(project),
                &json!({"team_size": 4}),
                &admin.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["team_size"], 4);

        let res = app.get_without_token(&routes::hackathon(id)).await;
        assert_eq!(res.body["total_participants"], 4);
    }

    #[tokio::test]
    async fn growing_past_the_limit_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Ongoing)
            .await;
        let project = app.submit_project(id, "Team A").await;

        let res = app
            .patch_with_token(
                &routes::project(project),
                &json!({"team_size": 5}),
                &admin.token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_STATE");

        let res = app
            .get_with_token(&routes::project(project), &admin.token)
            .await;
        assert_eq!(res.body["team_size"], 1);
    }

    #[tokio::test]
    async fn withdrawn_project_is_hidden_and_counters_drop() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Ongoing)
            .await;
        let project = app.submit_project(id, "Team A").await;

        let res = app
            .delete_with_token(&routes::project(project), &admin.token)
            .await;
        assert_eq!(res.status, 204, "{}", res.text);

        let res = app
            .get_with_token(&routes::project(project), &admin.token)
            .await;
        assert_eq!(res.status, 404);

        let res = app.get_without_token(&routes::hackathon(id)).await;
        assert_eq!(res.body["total_projects"], 0);
        assert_eq!(res.body["total_participants"], 0);
    }
}
