use serde_json::json;

use crate::common::{TestApp, routes};

async fn notify(app: &TestApp, token: &str, user_id: Option<i32>, title: &str) -> i32 {
    let res = app
        .post_with_token(
            routes::NOTIFICATIONS,
            &json!({
                "user_id": user_id,
                "title": title,
                "message": "Please read this.",
                "type": "announcement",
                "priority": "high",
            }),
            token,
        )
        .await;
    assert_eq!(res.status, 201, "create notification failed: {}", res.text);
    res.id()
}

#[tokio::test]
async fn users_see_their_own_and_global_notifications() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let a = app.create_judge("a@example.com").await;
    let b = app.create_judge("b@example.com").await;

    notify(&app, &admin.token, None, "Welcome everyone").await;
    notify(&app, &admin.token, Some(a.id), "For A").await;
    let for_b = notify(&app, &admin.token, Some(b.id), "For B").await;

    let res = app.get_with_token(routes::NOTIFICATIONS, &a.token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let titles: Vec<&str> = res.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"Welcome everyone"));
    assert!(titles.contains(&"For A"));
    assert_eq!(res.body["unread_count"], 2);
    assert_eq!(res.body["data"][0]["type"], "announcement");

    let res = app
        .get_with_token(&routes::notification(for_b), &a.token)
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn marking_read_sets_read_at_and_updates_unread_count() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let judge = app.create_judge("judge@example.com").await;
    let id = notify(&app, &admin.token, Some(judge.id), "Heads up").await;
    notify(&app, &admin.token, Some(judge.id), "Second").await;

    let res = app
        .patch_with_token(
            &routes::notification(id),
            &json!({"is_read": true}),
            &judge.token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["is_read"], true);
    assert!(res.body["read_at"].is_string());

    let res = app
        .get_with_token(
            &format!("{}?unread_only=true", routes::NOTIFICATIONS),
            &judge.token,
        )
        .await;
    assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(res.body["unread_count"], 1);
}

#[tokio::test]
async fn judges_cannot_edit_notification_content() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let judge = app.create_judge("judge@example.com").await;
    let id = notify(&app, &admin.token, Some(judge.id), "Heads up").await;

    let res = app
        .patch_with_token(
            &routes::notification(id),
            &json!({"title": "Changed"}),
            &judge.token,
        )
        .await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn mark_all_read_only_touches_visible_notifications() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let a = app.create_judge("a@example.com").await;
    let b = app.create_judge("b@example.com").await;
    notify(&app, &admin.token, Some(a.id), "For A").await;
    notify(&app, &admin.token, None, "Global").await;
    notify(&app, &admin.token, Some(b.id), "For B").await;

    let res = app
        .put_with_token(routes::NOTIFICATIONS_MARK_ALL_READ, &json!({}), &a.token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["updated"], 2);

    let res = app.get_with_token(routes::NOTIFICATIONS, &b.token).await;
    assert_eq!(res.body["unread_count"], 1);
}

#[tokio::test]
async fn notification_for_unknown_user_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;

    let res = app
        .post_with_token(
            routes::NOTIFICATIONS,
            &json!({"user_id": 9999, "title": "Hello", "message": "Anyone?"}),
            &admin.token,
        )
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn only_admins_delete_notifications() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let judge = app.create_judge("judge@example.com").await;
    let id = notify(&app, &admin.token, Some(judge.id), "Heads up").await;

    let res = app
        .delete_with_token(&routes::notification(id), &judge.token)
        .await;
    assert_eq!(res.status, 403);

    let res = app
        .delete_with_token(&routes::notification(id), &admin.token)
        .await;
    assert_eq!(res.status, 204);

    let res = app
        .get_with_token(&routes::notification(id), &judge.token)
        .await;
    assert_eq!(res.status, 404);
}
