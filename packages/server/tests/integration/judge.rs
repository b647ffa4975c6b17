use serde_json::json;

use crate::common::{TestApp, Window, routes};

mod create_judge {
    use super::*;

    #[tokio::test]
    async fn admin_creates_active_judge() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;

        let res = app
            .post_with_token(
                routes::JUDGES,
                &json!({
                    "name": "Grace Hopper",
                    "email": "grace@example.com",
                    "password": "compilers-rule",
                    "expertise": "Compilers",
                }),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["is_active"], true);
        assert_eq!(res.body["expertise"], "Compilers");
        assert_eq!(res.body["total_assignments"], 0);
        assert_eq!(res.body["total_scores"], 0);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        app.create_judge("grace@example.com").await;

        let res = app
            .post_with_token(
                routes::JUDGES,
                &json!({"name": "Grace", "email": "grace@example.com", "password": "compilers-rule"}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn judge_cannot_create_judges() {
        let app = TestApp::spawn().await;
        let judge = app.create_judge("judge@example.com").await;

        let res = app
            .post_with_token(
                routes::JUDGES,
                &json!({"name": "Sneaky", "email": "sneaky@example.com", "password": "compilers-rule"}),
                &judge.token,
            )
            .await;

        assert_eq!(res.status, 403);
    }
}

mod list_judges {
    use super::*;

    #[tokio::test]
    async fn search_matches_name_or_email_case_insensitively() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        app.create_judge("grace@example.com").await;
        app.create_judge("linus@example.com").await;

        let res = app
            .get_with_token(&format!("{}?search=GRACE", routes::JUDGES), &admin.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["email"], "grace@example.com");
        assert_eq!(res.body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn judge_detail_counts_assignments_and_scores() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let judge = app.create_judge("judge@example.com").await;
        let ongoing = app
            .create_hackathon(&admin.token, "Now", Window::Ongoing)
            .await;
        let upcoming = app
            .create_hackathon(&admin.token, "Later", Window::Upcoming)
            .await;
        app.assign_judges(ongoing, &[judge.id], &admin.token).await;
        app.assign_judges(upcoming, &[judge.id], &admin.token).await;
        let project = app.submit_project(ongoing, "Team A").await;
        let res = app.score(project, [6, 6, 6, 6], &judge.token).await;
        assert_eq!(res.status, 201, "{}", res.text);

        let res = app
            .get_with_token(&routes::judge(judge.id), &admin.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["total_assignments"], 2);
        assert_eq!(res.body["active_assignments"], 1);
        assert_eq!(res.body["total_scores"], 1);
        assert_eq!(res.body["hackathons"].as_array().unwrap().len(), 2);
    }
}

mod update_and_deactivate {
    use super::*;

    #[tokio::test]
    async fn changing_email_to_a_taken_one_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let judge = app.create_judge("judge@example.com").await;

        let res = app
            .patch_with_token(
                &routes::judge(judge.id),
                &json!({"email": "admin@example.com"}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn clearing_expertise_with_null() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let judge = app.create_judge("judge@example.com").await;

        let res = app
            .patch_with_token(
                &routes::judge(judge.id),
                &json!({"expertise": "Security"}),
                &admin.token,
            )
            .await;
        assert_eq!(res.body["expertise"], "Security");

        let res = app
            .patch_with_token(
                &routes::judge(judge.id),
                &json!({"expertise": null}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["expertise"].is_null());
    }

    #[tokio::test]
    async fn judge_on_an_ongoing_hackathon_cannot_be_deactivated() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let judge = app.create_judge("judge@example.com").await;
        let id = app
            .create_hackathon(&admin.token, "Now", Window::Ongoing)
            .await;
        app.assign_judges(id, &[judge.id], &admin.token).await;

        let res = app
            .delete_with_token(&routes::judge(judge.id), &admin.token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn deactivated_judge_is_kept_but_marked_inactive() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let judge = app.create_judge("judge@example.com").await;

        let res = app
            .delete_with_token(&routes::judge(judge.id), &admin.token)
            .await;
        assert_eq!(res.status, 204, "{}", res.text);

        let res = app
            .get_with_token(&routes::judge(judge.id), &admin.token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["is_active"], false);

        let res = app
            .get_with_token(&format!("{}?is_active=true", routes::JUDGES), &admin.token)
            .await;
        assert_eq!(res.body["pagination"]["total"], 0);
    }
}
