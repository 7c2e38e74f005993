use anyhow::{Context, Error};

use crate::git::repository::core::GitRepo;

impl GitRepo {
    /// Number of entries on the stash stack
    pub fn stash_count(&mut self) -> Result<usize, Error> {
        let mut count = 0;
        self.repo_mut()
            .stash_foreach(|_, _, _| {
                count += 1;
                true
            })
            .context("Failed to list stash entries")?;

        Ok(count)
    }

    /// Apply and drop the most recent stash entry (`git stash pop`)
    pub fn stash_pop(&mut self) -> Result<(), Error> {
        self.repo_mut()
            .stash_pop(0, None)
            .context("Failed to pop the latest stash entry")?;

        Ok(())
    }

    /// Stash tracked and untracked changes
    #[cfg(test)]
    pub fn stash_save(&mut self, message: &str) -> Result<(), Error> {
        let signature = self
            .create_signature()
            .context("Failed to create signature")?;

        self.repo_mut()
            .stash_save(&signature, message, Some(git2::StashFlags::INCLUDE_UNTRACKED))
            .context("Failed to stash changes")?;

        Ok(())
    }
}
