use anyhow::{Context, Error};
use git2::{Status, StatusOptions};

use crate::git::repository::core::GitRepo;

/// Paths grouped by working-tree state, read fresh for every decision
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
    pub not_added: Vec<String>,
    pub created: Vec<String>,
    pub deleted: Vec<String>,
    pub modified: Vec<String>,
    pub renamed: Vec<String>,
    pub conflicted: Vec<String>,
}

impl StatusSnapshot {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicted.is_empty()
    }

    /// Anything that a commit would pick up after staging everything
    pub fn has_uncommitted_changes(&self) -> bool {
        !self.not_added.is_empty()
            || !self.created.is_empty()
            || !self.deleted.is_empty()
            || !self.modified.is_empty()
            || !self.renamed.is_empty()
    }

    fn record(&mut self, path: String, status: Status) {
        if status.is_conflicted() {
            self.conflicted.push(path);
            return;
        }

        if status.is_wt_new() && !status.is_index_new() {
            self.not_added.push(path.clone());
        }
        if status.is_index_new() {
            self.created.push(path.clone());
        }
        if status.is_index_deleted() || status.is_wt_deleted() {
            self.deleted.push(path.clone());
        }
        if status.intersects(
            Status::INDEX_MODIFIED
                | Status::WT_MODIFIED
                | Status::INDEX_TYPECHANGE
                | Status::WT_TYPECHANGE,
        ) {
            self.modified.push(path.clone());
        }
        if status.is_index_renamed() || status.is_wt_renamed() {
            self.renamed.push(path);
        }
    }
}

impl GitRepo {
    pub fn status(&self) -> Result<StatusSnapshot, Error> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .renames_head_to_index(true);

        let statuses = self
            .repo()
            .statuses(Some(&mut options))
            .context("Failed to read repository status")?;

        let mut snapshot = StatusSnapshot::default();
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                continue;
            };
            snapshot.record(path.to_string(), entry.status());
        }

        Ok(snapshot)
    }
}
