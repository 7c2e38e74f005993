use anyhow::{Context, Result};
use octocrab::Octocrab;
use serde_json::json;

use super::{ssh_remote_url, Account, HostingProvider, RemoteRepository};

pub const KIND: &str = "github";

pub struct GitHubProvider {
    octocrab: Octocrab,
}

impl GitHubProvider {
    pub fn new() -> Result<Self> {
        let octocrab = Octocrab::builder()
            .build()
            .context("Failed to create GitHub client")?;

        Ok(Self { octocrab })
    }
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(err, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

#[async_trait::async_trait]
impl HostingProvider for GitHubProvider {
    fn kind(&self) -> &str {
        KIND
    }

    fn display_name(&self) -> &str {
        "GitHub"
    }

    fn set_token(&mut self, token: &str) -> Result<()> {
        self.octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .context("Failed to create authenticated GitHub client")?;
        Ok(())
    }

    fn token_url(&self) -> &str {
        "https://github.com/settings/tokens"
    }

    fn remote_url(&self, login: &str, name: &str) -> String {
        ssh_remote_url("github.com", login, name)
    }

    async fn get_user(&self) -> Result<Option<Account>> {
        let user: Account = self
            .octocrab
            .get("/user", None::<&()>)
            .await
            .context("Failed to fetch the authenticated GitHub user")?;
        Ok(Some(user))
    }

    async fn get_orgs(&self, _login: &str) -> Result<Option<Vec<Account>>> {
        let orgs: Vec<Account> = self
            .octocrab
            .get("/user/orgs", None::<&()>)
            .await
            .context("Failed to fetch GitHub organizations")?;
        Ok(Some(orgs))
    }

    async fn get_repo(&self, login: &str, name: &str) -> Result<Option<RemoteRepository>> {
        let route = format!("/repos/{login}/{name}");
        match self.octocrab.get::<RemoteRepository, _, ()>(route, None).await {
            Ok(repo) => Ok(Some(repo)),
            Err(err) if is_not_found(&err) => Ok(None),
            Err(err) => Err(err).context(format!("Failed to fetch GitHub repository {login}/{name}")),
        }
    }

    async fn create_repo(&self, name: &str) -> Result<Option<RemoteRepository>> {
        let repo: RemoteRepository = self
            .octocrab
            .post("/user/repos", Some(&json!({ "name": name })))
            .await
            .context(format!("Failed to create GitHub repository {name}"))?;
        Ok(Some(repo))
    }

    async fn create_org_repo(&self, name: &str, org: &str) -> Result<Option<RemoteRepository>> {
        let repo: RemoteRepository = self
            .octocrab
            .post(format!("/orgs/{org}/repos"), Some(&json!({ "name": name })))
            .await
            .context(format!("Failed to create GitHub repository {org}/{name}"))?;
        Ok(Some(repo))
    }
}
