//! Repository bootstrap.
//!
//! Runs before any commit workflow to make sure the provider, the token, the
//! owner and the remote repository are known, and that the working directory
//! is a git repository wired to `origin` and reconciled with it.

use std::path::Path;
use std::process::Command;

use super::context::RepositoryContext;
use super::sync::BranchSync;
use super::version::REMOTE;
use crate::config::{ensure_home_path, FlowConfig};
use crate::credentials::{CredentialKey, CredentialStore};
use crate::error::{FlowError, Result};
use crate::git::GitRepo;
use crate::hosting::{Account, HostingProvider, ProviderRegistry};
use crate::manifest::{ComponentManifest, PackageManifest};
use crate::prompt::{self, Prompter};
use crate::tui::report;

const GITIGNORE_TEMPLATE: &str = "\
.DS_Store
Thumbs.db
.idea/
.vscode/
*.log
npm-debug.log*
yarn-error.log*
node_modules/
dist/
build/
coverage/
.env
";

/// Whether the remote repository belongs to the user or to an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerKind {
    User,
    Org,
}

impl OwnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Org => "org",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "org" => Some(Self::Org),
            _ => None,
        }
    }
}

pub struct Bootstrap<'a> {
    config: &'a FlowConfig,
    prompter: &'a dyn Prompter,
    store: CredentialStore,
}

impl<'a> Bootstrap<'a> {
    pub fn new(config: &'a FlowConfig, prompter: &'a dyn Prompter) -> Self {
        Self {
            config,
            prompter,
            store: CredentialStore::new(&config.home_path),
        }
    }

    /// Full bootstrap; returns the linked and reconciled working copy
    pub async fn prepare(
        &self,
        registry: &ProviderRegistry,
        context: &RepositoryContext,
    ) -> Result<GitRepo> {
        ensure_home_path(&self.config.home_path)?;
        let mut provider = self.resolve_provider(registry)?;
        self.link(provider.as_mut(), context).await
    }

    /// Stored provider kind, or ask and store it
    pub fn resolve_provider(&self, registry: &ProviderRegistry) -> Result<Box<dyn HostingProvider>> {
        let stored = self.store.read(CredentialKey::Server)?;
        let kind = match stored {
            Some(kind) if !self.config.refresh_server => kind,
            _ => {
                let choices = registry.choices();
                let labels: Vec<String> = choices.iter().map(|(_, label)| label.to_string()).collect();
                let index = self.prompter.select("Hosting provider", &labels, 0)?;
                let (kind, _) = choices.get(index).ok_or_else(|| {
                    FlowError::Configuration("no hosting provider selected".to_string())
                })?;
                self.store.write(CredentialKey::Server, kind)?;
                kind.to_string()
            }
        };
        log::debug!("provider: {kind}");

        if !registry.contains(&kind) {
            return Err(FlowError::Configuration(format!("unsupported hosting provider '{kind}'")));
        }
        registry
            .create(&kind)
            .map_err(|e| FlowError::Configuration(format!("{e:#}")))?
            .ok_or_else(|| FlowError::Configuration(format!("no adapter registered for '{kind}'")))
    }

    /// Everything after provider selection: token, identity, owner, remote
    /// repository, working-copy setup and initial reconciliation
    pub async fn link(
        &self,
        provider: &mut dyn HostingProvider,
        context: &RepositoryContext,
    ) -> Result<GitRepo> {
        self.resolve_token(provider)?;

        let (user, orgs) = fetch_identity(&*provider).await?;
        log::debug!("user: {}, orgs: {orgs:?}", user.login);

        let (owner, login) = self.resolve_owner(&user, &orgs)?;
        log::debug!("owner: {} {login}", owner.as_str());

        ensure_remote_repository(&*provider, owner, &login, &context.name).await?;
        seed_gitignore(&context.working_dir);
        validate_component(&context.working_dir, &context.build_cmd)?;

        let mut repo = open_or_init(&context.working_dir)?;
        if repo.has_remote(REMOTE)? {
            log::debug!("{REMOTE} -> {}", repo.get_remote_url(REMOTE)?);
        } else {
            let url = provider.remote_url(&login, &context.name);
            repo.add_remote(REMOTE, &url)?;
            report::success(format!("Added remote {REMOTE} -> {url}"));
        }

        BranchSync::new(&mut repo, self.prompter, self.config).initial_commit()?;
        Ok(repo)
    }

    fn resolve_token(&self, provider: &mut dyn HostingProvider) -> Result<()> {
        let token = match self.store.read(CredentialKey::Token)? {
            Some(token) if !self.config.refresh_token => token,
            _ => {
                report::info(format!(
                    "Generate a {} token at {}",
                    provider.display_name(),
                    provider.token_url()
                ));
                let token = prompt::non_empty(self.config.prompt_attempts, || {
                    self.prompter.password("Token:")
                })?
                .ok_or_else(|| FlowError::Configuration("a hosting provider token is required".to_string()))?;
                self.store.write(CredentialKey::Token, &token)?;
                token
            }
        };

        provider
            .set_token(&token)
            .map_err(|e| FlowError::Configuration(format!("{e:#}")))
    }

    fn resolve_owner(&self, user: &Account, orgs: &[Account]) -> Result<(OwnerKind, String)> {
        let stored_owner = self
            .store
            .read(CredentialKey::Owner)?
            .and_then(|owner| OwnerKind::parse(&owner));
        let stored_login = self.store.read(CredentialKey::Login)?;

        if let (Some(owner), Some(login), false) = (stored_owner, stored_login, self.config.refresh_owner) {
            return Ok((owner, login));
        }

        let mut kinds = vec![OwnerKind::User];
        if !orgs.is_empty() {
            kinds.push(OwnerKind::Org);
        }
        let labels: Vec<String> = kinds.iter().map(|kind| kind.as_str().to_string()).collect();
        let owner = kinds[self.prompter.select("Repository owner", &labels, 0)?.min(kinds.len() - 1)];

        let login = match owner {
            OwnerKind::User => user.login.clone(),
            OwnerKind::Org => {
                let logins: Vec<String> = orgs.iter().map(|org| org.login.clone()).collect();
                let index = self.prompter.select("Organization", &logins, 0)?;
                logins
                    .get(index)
                    .cloned()
                    .ok_or_else(|| FlowError::Configuration("no organization selected".to_string()))?
            }
        };

        self.store.write(CredentialKey::Owner, owner.as_str())?;
        self.store.write(CredentialKey::Login, &login)?;
        Ok((owner, login))
    }
}

async fn fetch_identity(provider: &dyn HostingProvider) -> Result<(Account, Vec<Account>)> {
    let user = provider
        .get_user()
        .await
        .map_err(|e| FlowError::Authentication(format!("{e:#}")))?
        .ok_or_else(|| FlowError::Authentication("could not fetch the authenticated user".to_string()))?;

    let orgs = provider
        .get_orgs(&user.login)
        .await
        .map_err(|e| FlowError::Authentication(format!("{e:#}")))?
        .ok_or_else(|| FlowError::Authentication(format!("could not fetch organizations of {}", user.login)))?;

    Ok((user, orgs))
}

/// Reuse the remote repository if it exists, otherwise create it
async fn ensure_remote_repository(
    provider: &dyn HostingProvider,
    owner: OwnerKind,
    login: &str,
    name: &str,
) -> Result<()> {
    if provider
        .get_repo(login, name)
        .await
        .map_err(FlowError::Provider)?
        .is_some()
    {
        log::debug!("remote repository {login}/{name} exists");
        return Ok(());
    }

    let created = match owner {
        OwnerKind::User => provider.create_repo(name).await,
        OwnerKind::Org => provider.create_org_repo(name, login).await,
    };

    match created {
        Ok(Some(_)) => {
            report::success(format!("Created remote repository {login}/{name}"));
            Ok(())
        }
        Ok(None) => Err(FlowError::RemoteCreation {
            name: name.to_string(),
        }),
        Err(e) => {
            log::error!("creating {login}/{name} failed: {e:#}");
            Err(FlowError::RemoteCreation {
                name: name.to_string(),
            })
        }
    }
}

/// Write the default `.gitignore` unless one exists; failures only warn
pub fn seed_gitignore(dir: &Path) {
    let path = dir.join(".gitignore");
    if path.exists() {
        return;
    }
    if let Err(e) = std::fs::write(&path, GITIGNORE_TEMPLATE) {
        report::warn(format!("Could not write {}: {e}", path.display()));
    }
}

/// Build a component and check its output is present and published
pub fn validate_component(dir: &Path, build_cmd: &str) -> Result<()> {
    let Some(component) = ComponentManifest::load(dir)? else {
        return Ok(());
    };

    report::info(format!("Building component: {build_cmd}"));
    run_build(dir, build_cmd)?;

    let build_path = component.build_path.trim_start_matches("./").trim_end_matches('/');
    if !dir.join(build_path).exists() {
        return Err(FlowError::build_validation(format!(
            "build output '{build_path}' does not exist"
        )));
    }

    let manifest = PackageManifest::load(dir)?;
    let published = manifest
        .files()
        .iter()
        .any(|file| file.trim_start_matches("./").trim_end_matches('/') == build_path);
    if !published {
        return Err(FlowError::build_validation(format!(
            "build output '{build_path}' is not listed in package.json \"files\""
        )));
    }

    report::success(format!("Component built into {build_path}"));
    Ok(())
}

fn run_build(dir: &Path, build_cmd: &str) -> Result<()> {
    let mut command = if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.args(["/C", build_cmd]);
        command
    } else {
        let mut command = Command::new("sh");
        command.args(["-c", build_cmd]);
        command
    };

    let status = command
        .current_dir(dir)
        .status()
        .map_err(|e| FlowError::build_validation(format!("could not run '{build_cmd}': {e}")))?;

    if !status.success() {
        return Err(FlowError::build_validation(format!(
            "'{build_cmd}' exited with {status}"
        )));
    }
    Ok(())
}

fn open_or_init(dir: &Path) -> Result<GitRepo> {
    if GitRepo::is_initialized(dir) {
        log::debug!("{} is already a git repository", dir.display());
        return Ok(GitRepo::open(dir)?);
    }

    let repo = GitRepo::init(dir)?;
    report::success(format!("Initialized git repository in {}", dir.display()));
    Ok(repo)
}
