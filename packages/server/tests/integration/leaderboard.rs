use crate::common::{TestApp, Window, routes};

#[tokio::test]
async fn ties_on_average_break_on_judge_count_and_unscored_rank_last() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let a = app.create_judge("a@example.com").await;
    let b = app.create_judge("b@example.com").await;
    let id = app
        .create_hackathon(&admin.token, "Hack", Window::Ongoing)
        .await;
    app.assign_judges(id, &[a.id, b.id], &admin.token).await;

    let unscored = app.submit_project(id, "Team Quiet").await;
    let one_judge = app.submit_project(id, "Team Solo").await;
    let two_judges = app.submit_project(id, "Team Pair").await;

    assert_eq!(app.score(one_judge, [8, 7, 8, 7], &a.token).await.status, 201);
    assert_eq!(app.score(two_judges, [8, 7, 8, 7], &a.token).await.status, 201);
    assert_eq!(app.score(two_judges, [8, 7, 8, 7], &b.token).await.status, 201);

    let res = app.get_with_token(&routes::leaderboard(id), &a.token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let board = res.body["leaderboard"].as_array().unwrap();
    let order: Vec<i64> = board.iter().map(|e| e["project_id"].as_i64().unwrap()).collect();
    assert_eq!(
        order,
        vec![two_judges as i64, one_judge as i64, unscored as i64]
    );
    let ranks: Vec<i64> = board.iter().map(|e| e["rank"].as_i64().unwrap()).collect();
    assert_eq!(ranks, vec![1, 2, 3]);

    assert_eq!(board[0]["average_score"], 30.0);
    assert_eq!(board[0]["total_scores"], 2);
    assert_eq!(board[0]["total_possible_score"], 80);
    assert_eq!(board[0]["score_percentage"], 75.0);
    assert_eq!(board[0]["judge_scores"].as_array().unwrap().len(), 2);
    assert_eq!(board[2]["average_score"], 0.0);
    assert_eq!(board[2]["total_scores"], 0);
    assert_eq!(board[2]["score_percentage"], 0.0);

    let stats = &res.body["statistics"];
    assert_eq!(stats["total_projects"], 3);
    assert_eq!(stats["total_submissions"], 3);
    assert_eq!(stats["highest_score"], 30.0);
    assert_eq!(stats["lowest_score"], 0.0);
    assert_eq!(stats["average_score_overall"], 30.0);

    assert_eq!(res.body["hackathon"]["status"], "ongoing");
}

#[tokio::test]
async fn withdrawn_projects_are_left_out() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let id = app
        .create_hackathon(&admin.token, "Hack", Window::Ongoing)
        .await;
    let kept = app.submit_project(id, "Team Kept").await;
    let withdrawn = app.submit_project(id, "Team Gone").await;
    assert_eq!(app.score(withdrawn, [10, 10, 10, 10], &admin.token).await.status, 201);

    let res = app
        .delete_with_token(&routes::project(withdrawn), &admin.token)
        .await;
    assert_eq!(res.status, 204, "{}", res.text);

    let res = app.get_with_token(&routes::leaderboard(id), &admin.token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let board = res.body["leaderboard"].as_array().unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0]["project_id"], kept);
    assert_eq!(res.body["statistics"]["total_submissions"], 0);
}

#[tokio::test]
async fn empty_hackathon_has_zeroed_statistics() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let id = app
        .create_hackathon(&admin.token, "Hack", Window::Upcoming)
        .await;

    let res = app.get_with_token(&routes::leaderboard(id), &admin.token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert!(res.body["leaderboard"].as_array().unwrap().is_empty());
    assert_eq!(res.body["statistics"]["total_projects"], 0);
    assert_eq!(res.body["statistics"]["average_score_overall"], 0.0);
}

#[tokio::test]
async fn unknown_hackathon_returns_not_found() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;

    let res = app.get_with_token(&routes::leaderboard(9999), &admin.token).await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn anonymous_caller_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(&routes::leaderboard(1)).await;

    assert_eq!(res.status, 401);
}
