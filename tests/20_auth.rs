#[macro_use]
mod common;

use anyhow::Result;
use common::{TestServer, TEST_PASSWORD};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn api_requires_bearer_token() -> Result<()> {
    let server = TestServer::start().await?;

    for path in ["/api/profile", "/api/sessions", "/api/admin/users", "/api/checkins/summary"] {
        let (status, body) = server.get(path, None).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_unauthorized() -> Result<()> {
    let server = TestServer::start().await?;
    let (status, body) = server.get("/api/auth/whoami", Some("not.a.jwt")).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
    Ok(())
}

#[tokio::test]
async fn signup_validates_input() -> Result<()> {
    let server = TestServer::start().await?;
    let (status, body) = server
        .post("/auth/signup", None, json!({ "email": "not-an-email", "password": "short" }))
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["email"].is_string());
    assert!(body["field_errors"]["password"].is_string());
    Ok(())
}

#[tokio::test]
async fn signin_requires_both_fields() -> Result<()> {
    let server = TestServer::start().await?;
    let (status, body) = server.post("/auth/signin", None, json!({})).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["email"], "is required");
    assert_eq!(body["field_errors"]["password"], "is required");
    Ok(())
}

#[tokio::test]
async fn malformed_json_uses_error_envelope() -> Result<()> {
    let server = TestServer::start().await?;
    let resp = reqwest::Client::new()
        .post(format!("{}/auth/signin", server.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = resp.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn signup_signin_and_whoami() -> Result<()> {
    require_database!();
    let server = TestServer::start().await?;
    let user = server.signup("casey").await?;

    let (status, body) = server.get("/api/auth/whoami", user.token()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], user.email.as_str());
    assert_eq!(body["data"]["user"]["role"], "patient");
    assert_eq!(body["data"]["user"]["displayName"], "casey");

    let (status, body) = server
        .post("/auth/signin", None, json!({ "email": user.email.to_uppercase(), "password": TEST_PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["session"]["tokenType"], "Bearer");
    Ok(())
}

#[tokio::test]
async fn duplicate_email_conflicts() -> Result<()> {
    require_database!();
    let server = TestServer::start().await?;
    let user = server.signup("dana").await?;

    let (status, body) = server
        .post("/auth/signup", None, json!({ "email": user.email, "password": TEST_PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    require_database!();
    let server = TestServer::start().await?;
    let user = server.signup("eli").await?;

    let (status, wrong) = server
        .post("/auth/signin", None, json!({ "email": user.email, "password": "not the password" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown) = server
        .post("/auth/signin", None, json!({ "email": "nobody@test.mindcare.example", "password": "whatever123" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["error"], unknown["error"]);
    Ok(())
}

#[tokio::test]
async fn revoked_session_is_unauthorized() -> Result<()> {
    require_database!();
    let server = TestServer::start().await?;
    let user = server.signup("fern").await?;

    let (status, _) = server.delete("/api/auth/session", user.token()).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.get("/api/profile", user.token()).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Session expired or revoked");
    Ok(())
}

#[tokio::test]
async fn refresh_rotates_session() -> Result<()> {
    require_database!();
    let server = TestServer::start().await?;
    let user = server.signup("gray").await?;

    let (status, body) = server.put("/api/auth/session/refresh", user.token(), json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    let new_token = body["data"]["accessToken"].as_str().unwrap().to_string();

    let (status, _) = server.get("/api/profile", user.token()).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server.get("/api/profile", Some(new_token.as_str())).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn profile_update_never_changes_role() -> Result<()> {
    require_database!();
    let server = TestServer::start().await?;
    let user = server.signup("hale").await?;

    let (status, _) = server.put("/api/profile", user.token(), json!({ "role": "admin" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server
        .put("/api/profile", user.token(), json!({ "bio": "Here to listen", "age": 34 }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bio"], "Here to listen");
    assert_eq!(body["data"]["age"], 34);
    assert_eq!(body["data"]["role"], "patient");
    Ok(())
}

#[tokio::test]
async fn profile_age_outside_range_is_a_validation_error() -> Result<()> {
    require_database!();
    let server = TestServer::start().await?;
    let user = server.signup("iris").await?;

    for age in [5, 140] {
        let (status, body) = server.put("/api/profile", user.token(), json!({ "age": age })).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "age {age}");
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["field_errors"]["age"].is_string());
    }

    let (status, body) = server.put("/api/profile", user.token(), json!({ "age": 13 })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["age"], 13);
    Ok(())
}

#[tokio::test]
async fn prune_removes_ended_sessions_only() -> Result<()> {
    require_database!();
    let server = TestServer::start().await?;
    let leaving = server.signup("jude").await?;
    let staying = server.signup("kara").await?;

    let (status, _) = server.delete("/api/auth/session", leaving.token()).await?;
    assert_eq!(status, StatusCode::OK);

    let report = common::cli_json(&["db", "prune-sessions"])?;
    assert_eq!(report["success"], true);
    assert!(report["pruned"].as_u64().unwrap_or(0) >= 1);

    let (status, _) = server.get("/api/auth/whoami", staying.token()).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.get("/api/auth/whoami", leaving.token()).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
