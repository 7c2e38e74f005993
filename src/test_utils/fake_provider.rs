use std::sync::Mutex;

use anyhow::Result;

use crate::hosting::{Account, HostingProvider, RemoteRepository};

/// In-memory hosting provider. Remote URLs point at a local path so pushes
/// and fetches go to a bare test repository.
pub struct FakeProvider {
    pub user: Option<Account>,
    pub orgs: Option<Vec<Account>>,
    pub existing_repo: Option<RemoteRepository>,
    /// Whether create calls return a repository
    pub create_succeeds: bool,
    pub remote_path: String,
    token: Mutex<Option<String>>,
    created: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new(login: &str, remote_path: impl Into<String>) -> Self {
        Self {
            user: Some(Account {
                login: login.to_string(),
            }),
            orgs: Some(Vec::new()),
            existing_repo: None,
            create_succeeds: true,
            remote_path: remote_path.into(),
            token: Mutex::new(None),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn with_orgs(mut self, orgs: &[&str]) -> Self {
        self.orgs = Some(
            orgs.iter()
                .map(|login| Account {
                    login: login.to_string(),
                })
                .collect(),
        );
        self
    }

    pub fn with_existing_repo(mut self, name: &str) -> Self {
        self.existing_repo = Some(repository(name));
        self
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    /// Create calls so far: `user:<name>` or `org:<org>/<name>`
    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    fn record_create(&self, entry: String, name: &str) -> Option<RemoteRepository> {
        self.created.lock().unwrap().push(entry);
        self.create_succeeds.then(|| repository(name))
    }
}

fn repository(name: &str) -> RemoteRepository {
    RemoteRepository {
        name: name.to_string(),
        full_name: None,
        html_url: None,
        ssh_url: None,
    }
}

#[async_trait::async_trait]
impl HostingProvider for FakeProvider {
    fn kind(&self) -> &str {
        "fake"
    }

    fn display_name(&self) -> &str {
        "Fake"
    }

    fn set_token(&mut self, token: &str) -> Result<()> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn token_url(&self) -> &str {
        "https://fake.example.com/tokens"
    }

    fn remote_url(&self, _login: &str, _name: &str) -> String {
        self.remote_path.clone()
    }

    async fn get_user(&self) -> Result<Option<Account>> {
        Ok(self.user.clone())
    }

    async fn get_orgs(&self, _login: &str) -> Result<Option<Vec<Account>>> {
        Ok(self.orgs.clone())
    }

    async fn get_repo(&self, _login: &str, name: &str) -> Result<Option<RemoteRepository>> {
        Ok(self
            .existing_repo
            .clone()
            .filter(|repo| repo.name == name))
    }

    async fn create_repo(&self, name: &str) -> Result<Option<RemoteRepository>> {
        Ok(self.record_create(format!("user:{name}"), name))
    }

    async fn create_org_repo(&self, name: &str, org: &str) -> Result<Option<RemoteRepository>> {
        Ok(self.record_create(format!("org:{org}/{name}"), name))
    }
}
