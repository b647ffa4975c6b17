use serde_json::json;

use crate::common::{TestApp, Window, routes};

mod create_hackathon {
    use super::*;

    #[tokio::test]
    async fn admin_creates_hackathon_with_prizes_in_order() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;

        let res = app
            .post_with_token(
                routes::HACKATHONS,
                &json!({
                    "name": "Spring Hack",
                    "description": "Two days of building.",
                    "start_time": "2099-03-01T09:00:00Z",
                    "end_time": "2099-03-03T18:00:00Z",
                    "rules": "Teams of up to four.",
                    "prizes": [
                        {"title": "Grand Prize", "amount": 1500.5, "currency": "eur"},
                        {"title": "Runner Up", "amount": 500, "winners": 2},
                    ],
                }),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "upcoming");
        assert_eq!(res.body["team_size_limit"], 5);
        assert_eq!(res.body["total_projects"], 0);
        assert_eq!(res.body["created_by"], admin.id);

        let prizes = res.body["prizes"].as_array().unwrap();
        assert_eq!(prizes.len(), 2);
        assert_eq!(prizes[0]["title"], "Grand Prize");
        assert_eq!(prizes[0]["amount"], 1500.5);
        assert_eq!(prizes[0]["currency"], "EUR");
        assert_eq!(prizes[1]["currency"], "USD");
        assert_eq!(prizes[1]["winners"], 2);
    }

    #[tokio::test]
    async fn end_before_start_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;

        let res = app
            .post_with_token(
                routes::HACKATHONS,
                &json!({
                    "name": "Backwards",
                    "description": "Time runs the wrong way.",
                    "start_time": "2099-03-03T09:00:00Z",
                    "end_time": "2099-03-01T09:00:00Z",
                    "rules": "None.",
                }),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn judge_cannot_create_hackathon() {
        let app = TestApp::spawn().await;
        let judge = app.create_judge("judge@example.com").await;

        let res = app
            .post_with_token(
                routes::HACKATHONS,
                &json!({
                    "name": "Not allowed",
                    "description": "x",
                    "start_time": "2099-03-01T09:00:00Z",
                    "end_time": "2099-03-03T09:00:00Z",
                    "rules": "x",
                }),
                &judge.token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod list_and_get {
    use super::*;

    #[tokio::test]
    async fn status_filter_uses_time_window() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let upcoming = app
            .create_hackathon(&admin.token, "Later", Window::Upcoming)
            .await;
        let ongoing = app
            .create_hackathon(&admin.token, "Now", Window::Ongoing)
            .await;
        let completed = app
            .create_hackathon(&admin.token, "Before", Window::Completed)
            .await;

        for (status, id) in [
            ("upcoming", upcoming),
            ("ongoing", ongoing),
            ("completed", completed),
        ] {
            let res = app
                .get_without_token(&format!("{}?status={status}", routes::HACKATHONS))
                .await;
            assert_eq!(res.status, 200, "{}", res.text);
            let data = res.body["data"].as_array().unwrap();
            assert_eq!(data.len(), 1, "status={status}");
            assert_eq!(data[0]["id"], id);
            assert_eq!(data[0]["status"], status);
        }

        let all = app.get_without_token(routes::HACKATHONS).await;
        assert_eq!(all.body["pagination"]["total"], 3);
    }

    #[tokio::test]
    async fn unknown_hackathon_returns_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::hackathon(9999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod update_and_delete {
    use super::*;

    #[tokio::test]
    async fn moving_end_before_stored_start_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Upcoming)
            .await;

        let res = app
            .patch_with_token(
                &routes::hackathon(id),
                &json!({"end_time": "2000-01-01T00:00:00Z"}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn prizes_are_replaced_on_update() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Upcoming)
            .await;

        let res = app
            .patch_with_token(
                &routes::hackathon(id),
                &json!({"name": "Renamed", "prizes": [{"title": "Only Prize", "amount": 10}]}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Renamed");
        let prizes = res.body["prizes"].as_array().unwrap();
        assert_eq!(prizes.len(), 1);
        assert_eq!(prizes[0]["title"], "Only Prize");
    }

    #[tokio::test]
    async fn delete_removes_projects_and_scores() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Ongoing)
            .await;
        let project = app.submit_project(id, "Team A").await;
        let res = app.score(project, [5, 5, 5, 5], &admin.token).await;
        assert_eq!(res.status, 201, "{}", res.text);

        let res = app.delete_with_token(&routes::hackathon(id), &admin.token).await;
        assert_eq!(res.status, 204, "{}", res.text);

        let res = app.get_without_token(&routes::hackathon(id)).await;
        assert_eq!(res.status, 404);
        let res = app
            .get_with_token(&routes::project(project), &admin.token)
            .await;
        assert_eq!(res.status, 404);
    }
}

mod judge_assignment {
    use super::*;

    #[tokio::test]
    async fn assignment_replaces_the_whole_set() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let a = app.create_judge("a@example.com").await;
        let b = app.create_judge("b@example.com").await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Ongoing)
            .await;

        app.assign_judges(id, &[a.id, b.id], &admin.token).await;
        app.assign_judges(id, &[b.id], &admin.token).await;

        let res = app
            .get_with_token(&routes::hackathon_judges(id), &admin.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let judges = res.body.as_array().unwrap();
        assert_eq!(judges.len(), 1);
        assert_eq!(judges[0]["id"], b.id);
        assert_eq!(judges[0]["assigned_by"], admin.id);
    }

    #[tokio::test]
    async fn assigning_a_non_judge_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Ongoing)
            .await;

        let res = app
            .post_with_token(
                &routes::hackathon_judges(id),
                &json!({"judge_ids": [admin.id]}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn removal_only_touches_listed_judges() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let a = app.create_judge("a@example.com").await;
        let b = app.create_judge("b@example.com").await;
        let c = app.create_judge("c@example.com").await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Ongoing)
            .await;
        app.assign_judges(id, &[a.id, b.id, c.id], &admin.token).await;

        let res = app
            .delete_json_with_token(
                &routes::hackathon_judges(id),
                &json!({"judge_ids": [b.id]}),
                &admin.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["removed"], 1);

        let res = app
            .get_with_token(&routes::hackathon_judges(id), &admin.token)
            .await;
        let mut remaining: Vec<i64> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|j| j["id"].as_i64().unwrap())
            .collect();
        remaining.sort();
        assert_eq!(remaining, vec![a.id as i64, c.id as i64]);
    }

    #[tokio::test]
    async fn removal_with_empty_list_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let id = app
            .create_hackathon(&admin.token, "Hack", Window::Ongoing)
            .await;

        let res = app
            .delete_json_with_token(
                &routes::hackathon_judges(id),
                &json!({"judge_ids": []}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
