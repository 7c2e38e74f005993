//! Hosting provider abstraction.
//!
//! [`HostingProvider`] is the capability surface the bootstrapper needs from
//! a GitHub-like service. Concrete adapters live in [`github`] and [`gitee`];
//! [`registry::ProviderRegistry`] maps a provider kind id to a constructor so
//! new providers plug in without touching the workflows.

pub mod gitee;
pub mod github;
pub mod registry;

use anyhow::Result;
use serde::Deserialize;

pub use registry::ProviderRegistry;

/// A user or organization as returned by the provider
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub login: String,
}

/// Repository metadata; existence is what matters to the bootstrapper
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RemoteRepository {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub ssh_url: Option<String>,
}

#[async_trait::async_trait]
pub trait HostingProvider: Send + Sync {
    /// Registry id, also what gets persisted in `.git_server`
    fn kind(&self) -> &str;

    /// Human-readable name for prompts and messages
    fn display_name(&self) -> &str;

    fn set_token(&mut self, token: &str) -> Result<()>;

    /// Page where the user can generate a personal access token
    fn token_url(&self) -> &str;

    /// Clone/push URL for `<login>/<name>`
    fn remote_url(&self, login: &str, name: &str) -> String;

    async fn get_user(&self) -> Result<Option<Account>>;

    async fn get_orgs(&self, login: &str) -> Result<Option<Vec<Account>>>;

    /// `None` when the repository does not exist
    async fn get_repo(&self, login: &str, name: &str) -> Result<Option<RemoteRepository>>;

    async fn create_repo(&self, name: &str) -> Result<Option<RemoteRepository>>;

    async fn create_org_repo(&self, name: &str, org: &str) -> Result<Option<RemoteRepository>>;
}

/// SSH remote in the `git@host:login/name.git` form both providers accept
pub(crate) fn ssh_remote_url(host: &str, login: &str, name: &str) -> String {
    format!("git@{host}:{login}/{name}.git")
}
