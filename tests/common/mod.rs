#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

use blocklab_api::app;
use blocklab_api::testing::{memory_state, FakeCloudSession};

pub const PASSWORD: &str = "correct-horse";

/// An in-process server on an ephemeral port, backed by memory storage.
pub struct TestApp {
    pub base_url: String,
    pub cloud: Arc<FakeCloudSession>,
    pub client: reqwest::Client,
}

pub async fn spawn_app() -> Result<TestApp> {
    let (state, cloud) = memory_state();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app(state)).await;
    });

    Ok(TestApp {
        base_url: format!("http://{}", addr),
        cloud,
        client: reqwest::Client::new(),
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a cloud account and log into it. Returns the bearer token.
    pub async fn user(&self, email: &str, screenname: &str) -> Result<String> {
        self.cloud.add_user(email, PASSWORD, screenname, "en");
        self.login(email, PASSWORD).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/auth/login"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed with {}", res.status());

        let body: Value = res.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response without token")
    }

    /// Create a project through `POST /project/`. Returns the response body.
    pub async fn create_project(&self, token: &str, name: &str, sharing: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/project/"))
            .bearer_auth(token)
            .form(&[
                ("name", name),
                ("description", "test project"),
                ("sharing", sharing),
                ("type", "PROPC"),
                ("board", "activity-board"),
            ])
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "create failed with {}", res.status());
        Ok(res.json().await?)
    }

    pub async fn list(&self, token: &str, query: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(self.url(&format!("/project/list?{}", query)))
            .bearer_auth(token)
            .send()
            .await?)
    }
}

pub fn project_id(body: &Value) -> i64 {
    body["id"].as_i64().expect("project id in response")
}
