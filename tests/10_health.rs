mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = TestServer::start().await?;
    let (status, body) = server.get("/health", None).await?;

    if common::database_configured() {
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
    } else {
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    }
    Ok(())
}

#[tokio::test]
async fn root_describes_service() -> Result<()> {
    let server = TestServer::start().await?;
    let (status, body) = server.get("/", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "MindCare API");
    assert!(body["data"]["version"].is_string());
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_json_404() -> Result<()> {
    let server = TestServer::start().await?;
    let (status, body) = server.get("/no/such/route", None).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}
