#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use global_api::auth::hash_password;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const JWT_ISSUER: &str = "global-api";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let users = [("alice", "wonderland"), ("bob", "builder123")]
            .iter()
            .map(|(user, password)| format!("{}:{}", user, hash_password(user, password)))
            .collect::<Vec<_>>()
            .join(",");

        let child = Command::new(env!("CARGO_BIN_EXE_global-api"))
            .arg("serve")
            .env("APP_ENV", "development")
            .env("API_PORT", port.to_string())
            .env("JWT_SECRET", JWT_SECRET)
            .env("JWT_ISSUER", JWT_ISSUER)
            .env("AUTH_USERS", users)
            .env("PAGE_SIZE", "1")
            .env("APP_LANGUAGE", "en")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// POST a JSON body and return status plus parsed body
pub async fn post_json(url: &str, body: &Value, token: Option<&str>) -> Result<(StatusCode, Value)> {
    let mut request = reqwest::Client::new().post(url).json(body);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    let res = request.send().await?;
    let status = res.status();
    Ok((status, res.json::<Value>().await?))
}

pub async fn get_json(url: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
    let mut request = reqwest::Client::new().get(url);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    let res = request.send().await?;
    let status = res.status();
    Ok((status, res.json::<Value>().await?))
}

/// Log in as a seeded user and return the access token
pub async fn access_token(server: &TestServer, username: &str, password: &str) -> Result<String> {
    let (status, body) = post_json(
        &server.url("/auth/login/"),
        &json!({"username": username, "password": password}),
        None,
    )
    .await?;
    anyhow::ensure!(status == StatusCode::OK, "login failed with {}: {}", status, body);
    body["access"]
        .as_str()
        .map(str::to_string)
        .context("login response has no access token")
}
