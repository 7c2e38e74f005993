use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{ssh_remote_url, Account, HostingProvider, RemoteRepository};

pub const KIND: &str = "gitee";

const API_URL: &str = "https://gitee.com/api/v5";

/// Gitee v5 REST API; the token travels as the `access_token` parameter
pub struct GiteeProvider {
    client: Client,
    token: Option<String>,
}

impl GiteeProvider {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gitpub/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create Gitee client")?;

        Ok(Self {
            client,
            token: None,
        })
    }

    fn token(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let resp = self
            .client
            .get(format!("{API_URL}{path}"))
            .query(&[("access_token", self.token())])
            .send()
            .await
            .context("Gitee API request failed")?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = resp
            .error_for_status()
            .context("Gitee API returned an error")?
            .json()
            .await
            .context("Failed to parse Gitee API response")?;
        Ok(Some(body))
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        let mut body = body;
        body["access_token"] = json!(self.token());

        self.client
            .post(format!("{API_URL}{path}"))
            .json(&body)
            .send()
            .await
            .context("Gitee API request failed")?
            .error_for_status()
            .context("Gitee API returned an error")?
            .json()
            .await
            .context("Failed to parse Gitee API response")
    }
}

#[async_trait::async_trait]
impl HostingProvider for GiteeProvider {
    fn kind(&self) -> &str {
        KIND
    }

    fn display_name(&self) -> &str {
        "Gitee"
    }

    fn set_token(&mut self, token: &str) -> Result<()> {
        self.token = Some(token.to_string());
        Ok(())
    }

    fn token_url(&self) -> &str {
        "https://gitee.com/personal_access_tokens"
    }

    fn remote_url(&self, login: &str, name: &str) -> String {
        ssh_remote_url("gitee.com", login, name)
    }

    async fn get_user(&self) -> Result<Option<Account>> {
        self.get("/user").await
    }

    async fn get_orgs(&self, login: &str) -> Result<Option<Vec<Account>>> {
        self.get(&format!("/users/{login}/orgs")).await
    }

    async fn get_repo(&self, login: &str, name: &str) -> Result<Option<RemoteRepository>> {
        self.get(&format!("/repos/{login}/{name}")).await
    }

    async fn create_repo(&self, name: &str) -> Result<Option<RemoteRepository>> {
        let repo = self.post("/user/repos", json!({ "name": name })).await?;
        Ok(Some(repo))
    }

    async fn create_org_repo(&self, name: &str, org: &str) -> Result<Option<RemoteRepository>> {
        let repo = self
            .post(&format!("/orgs/{org}/repos"), json!({ "name": name, "org": org }))
            .await?;
        Ok(Some(repo))
    }
}
