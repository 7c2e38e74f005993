use super::context::RepositoryContext;
use super::sync::BranchSync;
use super::version::{resolve_context, Resolution};
use crate::config::FlowConfig;
use crate::error::Result;
use crate::git::GitRepo;
use crate::prompt::Prompter;

/// resolve version -> stash -> conflicts -> commit -> checkout -> pull -> push.
/// The first failing step aborts the rest and its error is returned as is.
pub struct CommitWorkflow<'a> {
    config: &'a FlowConfig,
    prompter: &'a dyn Prompter,
}

impl<'a> CommitWorkflow<'a> {
    pub fn new(config: &'a FlowConfig, prompter: &'a dyn Prompter) -> Self {
        Self { config, prompter }
    }

    pub fn run(&self, repo: &mut GitRepo, context: &mut RepositoryContext) -> Result<Resolution> {
        let resolution = resolve_context(repo, context, self.prompter)?;

        let mut sync = BranchSync::new(repo, self.prompter, self.config);
        sync.check_stash()?;
        sync.check_conflicted()?;
        sync.check_not_committed()?;
        sync.checkout_branch(&resolution.branch)?;
        sync.pull_remote_main_and_branch(&resolution.version)?;
        sync.push_remote_repo(&resolution.branch)?;

        Ok(resolution)
    }
}
