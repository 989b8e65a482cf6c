#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

/// A server process on its own port, killed when dropped
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    client: reqwest::Client,
    child: Child,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(&[]).await
    }

    /// Start with extra environment overrides, e.g. `("FORUM_REQUIRE_POST_APPROVAL", "true")`
    pub async fn start_with(envs: &[(&str, &str)]) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_mindcare-api"));
        cmd.env("APP_ENV", "development")
            .env("MINDCARE_API_PORT", port.to_string())
            .env_remove("PORT")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());
        for (key, value) in envs {
            cmd.env(key, value);
        }

        let child = cmd.spawn().context("failed to spawn server binary")?;
        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            child,
        };
        server.wait_ready(Duration::from_secs(15)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub async fn request(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PUT, path, token, Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PATCH, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, path, token, None).await
    }

    /// Sign up a fresh account (patient role)
    pub async fn signup(&self, name: &str) -> Result<TestUser> {
        let email = format!("{}-{}@test.mindcare.example", name, uuid::Uuid::new_v4().simple());
        let (status, body) = self
            .post(
                "/auth/signup",
                None,
                json!({ "email": email, "password": TEST_PASSWORD, "displayName": name }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "signup failed: {} {}", status, body);

        Ok(TestUser {
            id: body["data"]["user"]["id"].as_str().context("missing user id")?.to_string(),
            email,
            token: body["data"]["session"]["accessToken"]
                .as_str()
                .context("missing access token")?
                .to_string(),
        })
    }

    /// Sign up and promote through the maintenance CLI
    pub async fn signup_as(&self, name: &str, role: &str) -> Result<TestUser> {
        let user = self.signup(name).await?;
        set_role(&user.email, role)?;
        Ok(user)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub const TEST_PASSWORD: &str = "correct horse battery";

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

impl TestUser {
    pub fn token(&self) -> Option<&str> {
        Some(&self.token)
    }
}

/// Database-backed scenarios only run when a database is configured
pub fn database_configured() -> bool {
    std::env::var("DATABASE_URL").map(|v| !v.trim().is_empty()).unwrap_or(false)
}

pub fn set_role(email: &str, role: &str) -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_mindcare"))
        .args(["user", "set-role", email, role])
        .output()
        .context("failed to run mindcare CLI")?;
    anyhow::ensure!(
        output.status.success(),
        "set-role failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(())
}

/// Run the `mindcare` CLI with `--json` and parse what it prints
pub fn cli_json(args: &[&str]) -> Result<Value> {
    let output = Command::new(env!("CARGO_BIN_EXE_mindcare"))
        .arg("--json")
        .args(args)
        .output()
        .context("failed to run mindcare CLI")?;
    anyhow::ensure!(
        output.status.success(),
        "mindcare {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).context("CLI output is not JSON")
}

/// Run one statement binding `$1` to `id`, straight against the test database
pub async fn execute_sql(sql: &str, id: &str) -> Result<u64> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let pool = sqlx::PgPool::connect(&url).await?;
    let id = uuid::Uuid::parse_str(id)?;
    let done = sqlx::query(sql).bind(id).execute(&pool).await?;
    pool.close().await;
    Ok(done.rows_affected())
}

/// Skip the calling test when no database is configured
#[allow(unused_macros)]
macro_rules! require_database {
    () => {
        if !common::database_configured() {
            eprintln!("DATABASE_URL not set; skipping database scenario");
            return Ok(());
        }
    };
}
