#[macro_use]
mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn deleting_post_removes_comments() -> Result<()> {
    require_database!();
    let server = TestServer::start().await?;
    let author = server.signup("dev").await?;
    let reader = server.signup("eve").await?;

    let (status, body) = server
        .post("/api/posts", author.token(), json!({ "title": "Sleep tips", "content": "What helps you?", "category": "sleep" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["isApproved"], true);
    let post_path = format!("/api/posts/{}", body["data"]["id"].as_str().unwrap());

    let (status, body) = server
        .post(&format!("{}/comments", post_path), reader.token(), json!({ "content": "No screens after 10" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = server.get(&post_path, reader.token()).await?;
    assert_eq!(body["data"]["post"]["commentCount"], 1);
    assert_eq!(body["data"]["comments"][0]["authorName"], "eve");

    let (status, _) = server.delete(&post_path, reader.token()).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server.delete(&post_path, author.token()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["commentsDeleted"], 1);

    let (status, _) = server.get(&post_path, author.token()).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.delete(&format!("/api/comments/{}", comment_id), reader.token()).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn moderated_posts_hidden_until_approved() -> Result<()> {
    require_database!();
    let server = TestServer::start_with(&[("FORUM_REQUIRE_POST_APPROVAL", "true")]).await?;
    let admin = server.signup_as("fay", "admin").await?;
    let author = server.signup("gus").await?;
    let reader = server.signup("hal").await?;

    let (_, body) = server
        .post("/api/posts", author.token(), json!({ "title": "First post", "content": "Hello all" }))
        .await?;
    assert_eq!(body["data"]["isApproved"], false);
    let post_id = body["data"]["id"].as_str().unwrap().to_string();
    let post_path = format!("/api/posts/{}", post_id);

    let (status, _) = server.get(&post_path, reader.token()).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = server.get(&post_path, author.token()).await?;
    assert_eq!(status, StatusCode::OK);

    let approval = format!("/api/admin/posts/{}/approval", post_id);
    let (status, _) = server.post(&approval, reader.token(), json!({ "approved": true })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server.post(&approval, admin.token(), json!({ "approved": true })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isApproved"], true);

    let (status, _) = server.get(&post_path, reader.token()).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn only_author_edits_post() -> Result<()> {
    require_database!();
    let server = TestServer::start().await?;
    let author = server.signup("ivy").await?;
    let other = server.signup("jay").await?;

    let (_, body) = server
        .post("/api/posts", author.token(), json!({ "title": "Draft", "content": "v1" }))
        .await?;
    let post_path = format!("/api/posts/{}", body["data"]["id"].as_str().unwrap());

    let (status, _) = server.put(&post_path, other.token(), json!({ "content": "hijack" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server.put(&post_path, author.token(), json!({ "content": "v2" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "v2");
    assert_eq!(body["data"]["title"], "Draft");
    Ok(())
}

#[tokio::test]
async fn mood_outside_range_is_rejected() -> Result<()> {
    require_database!();
    let server = TestServer::start().await?;
    let user = server.signup("kim").await?;

    for mood in [0, 6, -1] {
        let (status, body) = server.post("/api/checkins", user.token(), json!({ "mood": mood })).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "mood {mood}");
        assert_eq!(body["field_errors"]["mood"], "must be between 1 and 5");
    }

    let (_, body) = server.get("/api/checkins", user.token()).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn checkins_and_summary() -> Result<()> {
    require_database!();
    let server = TestServer::start().await?;
    let user = server.signup("lou").await?;

    for mood in [2, 4] {
        let (status, _) = server
            .post("/api/checkins", user.token(), json!({ "mood": mood, "notes": "ok" }))
            .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = server.get("/api/checkins?limit=1", user.token()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, body) = server.get("/api/checkins/summary?days=7", user.token()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 2);
    assert_eq!(body["data"]["averageMood"], 3.0);
    assert_eq!(body["data"]["days"], 7);
    Ok(())
}

#[tokio::test]
async fn moderated_comments_wait_for_admin_approval() -> Result<()> {
    require_database!();
    let server = TestServer::start_with(&[("FORUM_REQUIRE_POST_APPROVAL", "true")]).await?;
    let admin = server.signup_as("max", "admin").await?;
    let commenter = server.signup("nia").await?;
    let reader = server.signup("otto").await?;

    let (_, body) = server
        .post("/api/posts", admin.token(), json!({ "title": "Welcome", "content": "Introduce yourself" }))
        .await?;
    assert_eq!(body["data"]["isApproved"], true);
    let post_path = format!("/api/posts/{}", body["data"]["id"].as_str().unwrap());

    let (status, body) = server
        .post(&format!("{}/comments", post_path), commenter.token(), json!({ "content": "Hi everyone" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["isApproved"], false);
    let comment_id = body["data"]["id"].as_str().unwrap().to_string();

    // Hidden comments are neither listed nor counted
    let (_, body) = server.get(&post_path, reader.token()).await?;
    assert_eq!(body["data"]["post"]["commentCount"], 0);
    assert_eq!(body["data"]["comments"].as_array().map(Vec::len), Some(0));

    let (_, body) = server.get(&post_path, commenter.token()).await?;
    assert_eq!(body["data"]["post"]["commentCount"], 1);
    assert_eq!(body["data"]["comments"].as_array().map(Vec::len), Some(1));

    let (_, body) = server.get(&post_path, admin.token()).await?;
    assert_eq!(body["data"]["post"]["commentCount"], 1);
    assert_eq!(body["data"]["comments"][0]["id"], comment_id.as_str());

    let approval = format!("/api/admin/comments/{}/approval", comment_id);
    let (status, _) = server.post(&approval, reader.token(), json!({ "approved": true })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server.post(&approval, admin.token(), json!({ "approved": true })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isApproved"], true);

    let (_, body) = server.get(&post_path, reader.token()).await?;
    assert_eq!(body["data"]["post"]["commentCount"], 1);
    assert_eq!(body["data"]["comments"][0]["content"], "Hi everyone");
    Ok(())
}

#[tokio::test]
async fn summary_ignores_checkins_outside_window() -> Result<()> {
    require_database!();
    let server = TestServer::start().await?;
    let user = server.signup("pam").await?;

    let (status, _) = server.post("/api/checkins", user.token(), json!({ "mood": 2 })).await?;
    assert_eq!(status, StatusCode::CREATED);
    common::execute_sql(
        "UPDATE mental_health_checkins SET created_at = now() - interval '30 days' WHERE user_id = $1",
        &user.id,
    )
    .await?;

    let (status, body) = server.get("/api/checkins/summary?days=7", user.token()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 0);
    assert!(body["data"]["averageMood"].is_null());
    assert!(body["data"]["latest"].is_null());

    let (_, body) = server.get("/api/checkins/summary?days=60", user.token()).await?;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["latest"]["moodRating"], 2);
    Ok(())
}
