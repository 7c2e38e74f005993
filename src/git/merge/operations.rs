use anyhow::{Context, Error};
use git2::{build::CheckoutBuilder, Commit, ResetType};

use crate::git::repository::core::GitRepo;

/// What a merge or pull did to the current branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    UpToDate,
    FastForward(String),
    Merged(String),
    /// The merge stopped with conflicts written to the index and working tree
    Conflicts(Vec<String>),
}

impl GitRepo {
    /// Merge a local branch into the current branch
    #[cfg(test)]
    pub fn merge(&self, branch_name: &str, message: Option<&str>) -> Result<MergeOutcome, Error> {
        let default_message = format!("Merge branch '{branch_name}'");
        self.merge_reference(
            &format!("refs/heads/{branch_name}"),
            message.unwrap_or(&default_message),
        )
    }

    /// Merge any reference (e.g. `refs/remotes/origin/main`) into the current
    /// branch. Unrelated histories are merged against an empty base.
    pub fn merge_reference(&self, reference: &str, message: &str) -> Result<MergeOutcome, Error> {
        let target_commit = self
            .repo()
            .revparse_single(reference)
            .context(format!("Failed to find '{reference}'"))?
            .peel_to_commit()
            .context("Failed to get target commit")?;

        self.merge_commit(&target_commit, message)
    }

    pub(crate) fn merge_commit(
        &self,
        target_commit: &Commit<'_>,
        message: &str,
    ) -> Result<MergeOutcome, Error> {
        let annotated_commit = self
            .repo()
            .find_annotated_commit(target_commit.id())
            .context("Failed to create annotated commit")?;

        let (analysis, _) = self
            .repo()
            .merge_analysis(&[&annotated_commit])
            .context("Failed to analyze merge")?;

        if analysis.is_up_to_date() {
            return Ok(MergeOutcome::UpToDate);
        }

        if analysis.is_fast_forward() || analysis.is_unborn() {
            self.fast_forward_to(target_commit)?;
            return Ok(MergeOutcome::FastForward(target_commit.id().to_string()));
        }

        if !analysis.is_normal() {
            return Err(anyhow::anyhow!("Unsupported merge analysis result"));
        }

        let signature = self
            .create_signature()
            .context("Failed to create signature")?;

        let head_commit = self
            .repo()
            .head()
            .context("Failed to get HEAD")?
            .peel_to_commit()
            .context("Failed to get current commit")?;

        let mut merge_options = git2::MergeOptions::new();
        let mut checkout_opts = CheckoutBuilder::new();
        checkout_opts.conflict_style_merge(true);

        self.repo()
            .merge(
                &[&annotated_commit],
                Some(&mut merge_options),
                Some(&mut checkout_opts),
            )
            .context("Failed to perform merge")?;

        let mut index = self
            .repo()
            .index()
            .context("Failed to get index after merge")?;

        if index.has_conflicts() {
            let mut paths = Vec::new();
            for conflict in index.conflicts().context("Failed to read conflicts")? {
                let conflict = conflict.context("Failed to read conflict entry")?;
                let entry = conflict.our.or(conflict.their).or(conflict.ancestor);
                if let Some(entry) = entry {
                    paths.push(String::from_utf8_lossy(&entry.path).into_owned());
                }
            }
            return Ok(MergeOutcome::Conflicts(paths));
        }

        let tree_id = index.write_tree().context("Failed to write merge tree")?;
        let tree = self
            .repo()
            .find_tree(tree_id)
            .context("Failed to find merge tree")?;

        let merge_commit_id = self
            .repo()
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &[&head_commit, target_commit],
            )
            .context("Failed to create merge commit")?;

        self.repo()
            .cleanup_state()
            .context("Failed to cleanup merge state")?;

        Ok(MergeOutcome::Merged(merge_commit_id.to_string()))
    }

    /// Point the current branch at `target_commit` and update the working tree
    fn fast_forward_to(&self, target_commit: &Commit<'_>) -> Result<(), Error> {
        let current_branch_name = self
            .get_current_branch()
            .context("Failed to get current branch")?;

        self.repo()
            .reference(
                &format!("refs/heads/{current_branch_name}"),
                target_commit.id(),
                true,
                "Fast-forward merge",
            )
            .context("Failed to update branch reference")?;

        if !self.is_bare() {
            let target_tree = target_commit.tree().context("Failed to get target tree")?;
            let mut checkout_opts = CheckoutBuilder::new();
            checkout_opts.force();
            self.repo()
                .checkout_tree(target_tree.as_object(), Some(&mut checkout_opts))
                .context("Failed to checkout target tree")?;
        }

        Ok(())
    }

    /// `git reset --hard <reference>`, also clearing any in-progress merge
    pub fn reset_hard(&self, reference: &str) -> Result<(), Error> {
        let target = self
            .repo()
            .revparse_single(reference)
            .context(format!("Failed to find '{reference}'"))?;

        self.repo()
            .reset(&target, ResetType::Hard, None)
            .context(format!("Failed to hard reset to '{reference}'"))?;

        self.repo()
            .cleanup_state()
            .context("Failed to cleanup merge state")?;

        Ok(())
    }
}
