//! Gates that bring the working copy into a mergeable, committed state and
//! reconcile it with `origin`.

use semver::Version;

use super::version::{dev_branch, parse_version_refs, RefKind, REMOTE};
use crate::config::FlowConfig;
use crate::error::{FlowError, Result};
use crate::git::repository::core::DEFAULT_BRANCH;
use crate::git::{GitRepo, MergeOutcome};
use crate::prompt::{self, Prompter};
use crate::tui::report;

pub struct BranchSync<'a> {
    repo: &'a mut GitRepo,
    prompter: &'a dyn Prompter,
    config: &'a FlowConfig,
}

impl<'a> BranchSync<'a> {
    pub fn new(repo: &'a mut GitRepo, prompter: &'a dyn Prompter, config: &'a FlowConfig) -> Self {
        Self {
            repo,
            prompter,
            config,
        }
    }

    /// Pop the most recent stash entry if there is one
    pub fn check_stash(&mut self) -> Result<bool> {
        let count = self.repo.stash_count()?;
        if count == 0 {
            return Ok(false);
        }

        log::debug!("{count} stash entries, popping the latest");
        self.repo.stash_pop()?;
        report::info("Restored stashed changes");
        Ok(true)
    }

    /// Refuse to go on while the index has unresolved conflicts
    pub fn check_conflicted(&self) -> Result<()> {
        let status = self.repo.status()?;
        if status.has_conflicts() {
            return Err(FlowError::Conflict {
                paths: status.conflicted,
            });
        }
        Ok(())
    }

    /// Stage everything and commit it with a prompted message.
    /// Returns the new commit id, or `None` when the tree was clean.
    pub fn check_not_committed(&self) -> Result<Option<String>> {
        let status = self.repo.status()?;
        if !status.has_uncommitted_changes() {
            return Ok(None);
        }
        log::debug!("uncommitted changes: {status:?}");

        self.repo.add_all()?;

        let attempts = self.config.commit_message_attempts;
        let message = prompt::non_empty(attempts, || self.prompter.text("Commit message:"))?
            .ok_or(FlowError::CommitMessageRequired { attempts })?;

        let id = self.repo.commit(&message)?;
        report::success(format!("Committed {}", &id[..id.len().min(7)]));
        Ok(Some(id))
    }

    /// Switch to `branch`, creating it from HEAD if it does not exist locally
    pub fn checkout_branch(&self, branch: &str) -> Result<()> {
        if self.repo.branch_exists(branch)? {
            self.repo.checkout_branch(branch)?;
        } else {
            self.repo.create_and_checkout_branch(branch)?;
            log::debug!("created local branch {branch}");
        }
        report::success(format!("On branch {branch}"));
        Ok(())
    }

    /// Pull `main`, then the remote development branch for `version` if the
    /// remote has one, checking for conflicts after each.
    /// A remote without `main` gets the local one pushed instead.
    pub fn pull_remote_main_and_branch(&self, version: &Version) -> Result<()> {
        let refs = self.repo.list_remote_refs(REMOTE)?;
        let main_ref = format!("refs/heads/{DEFAULT_BRANCH}");

        if refs.iter().any(|line| line.split('\t').nth(1) == Some(main_ref.as_str())) {
            self.pull(DEFAULT_BRANCH)?;
            self.check_conflicted()?;
        } else if self.repo.branch_exists(DEFAULT_BRANCH)? {
            log::info!("{REMOTE} has no {DEFAULT_BRANCH} yet, creating it");
            self.push_remote_repo(DEFAULT_BRANCH)?;
        } else {
            log::warn!("neither {REMOTE} nor the working copy has a {DEFAULT_BRANCH} branch");
        }

        let branch = dev_branch(version);
        let remote_versions = parse_version_refs(&refs, RefKind::Development);

        if remote_versions.contains(version) {
            self.pull(&branch)?;
            self.check_conflicted()?;
        } else {
            log::info!("{REMOTE} has no {branch} yet, nothing to pull");
        }
        Ok(())
    }

    pub fn push_remote_repo(&self, branch: &str) -> Result<()> {
        self.repo.push(REMOTE, branch)?;
        report::success(format!("Pushed {branch} to {REMOTE}"));
        Ok(())
    }

    /// First reconciliation of a freshly linked working copy with `origin`.
    ///
    /// Local changes are committed first. If `origin/main` exists it is merged
    /// in, otherwise the local `main` is pushed to create it. A failed merge
    /// on `main` hard-resets the local history onto `origin/main` (unless
    /// reset recovery is disabled). On any other branch the failure is
    /// returned and no local commit is discarded.
    pub fn initial_commit(&self) -> Result<()> {
        self.check_conflicted()?;
        self.check_not_committed()?;

        if !self.repo.remote_has_branch(REMOTE, DEFAULT_BRANCH)? {
            if !self.repo.has_commits() {
                report::warn(format!(
                    "Nothing to push yet, {REMOTE}/{DEFAULT_BRANCH} will be created by the first commit"
                ));
                return Ok(());
            }
            log::debug!("{REMOTE} has no {DEFAULT_BRANCH}, pushing local history");
            return self.push_remote_repo(DEFAULT_BRANCH);
        }

        self.repo.fetch(REMOTE, Some(DEFAULT_BRANCH))?;
        let reference = format!("refs/remotes/{REMOTE}/{DEFAULT_BRANCH}");
        let message = format!("Merge branch '{REMOTE}/{DEFAULT_BRANCH}'");
        let on_main = self.repo.get_current_branch().ok().as_deref() == Some(DEFAULT_BRANCH);

        let reason = match self.repo.merge_reference(&reference, &message) {
            Ok(MergeOutcome::Conflicts(paths)) if !on_main => {
                return Err(FlowError::Conflict { paths });
            }
            Ok(MergeOutcome::Conflicts(paths)) => format!("conflicts in {}", paths.join(", ")),
            Ok(outcome) => {
                log::debug!("merged {REMOTE}/{DEFAULT_BRANCH}: {outcome:?}");
                return Ok(());
            }
            Err(e) => format!("{e:#}"),
        };

        log::warn!("merging {REMOTE}/{DEFAULT_BRANCH} failed: {reason}");
        if !on_main || !self.config.reset_recovery {
            return Err(FlowError::MergeRecovery { reason });
        }

        self.repo.reset_hard(&reference).map_err(|e| FlowError::MergeRecovery {
            reason: format!("{reason}; reset onto {REMOTE}/{DEFAULT_BRANCH} failed: {e:#}"),
        })?;
        report::warn(format!(
            "Could not merge {REMOTE}/{DEFAULT_BRANCH} ({reason}); local history was reset onto it"
        ));
        Ok(())
    }

    fn pull(&self, branch: &str) -> Result<()> {
        let outcome = self
            .repo
            .pull(REMOTE, Some(branch))
            .map_err(|source| FlowError::Pull {
                branch: branch.to_string(),
                source,
            })?;

        match outcome {
            MergeOutcome::Conflicts(paths) => {
                log::warn!("pulling {branch} left conflicts in {}", paths.join(", "))
            }
            outcome => log::debug!("pulled {REMOTE}/{branch}: {outcome:?}"),
        }
        Ok(())
    }
}
