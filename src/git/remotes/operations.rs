use std::cell::RefCell;

use anyhow::{Context, Error};

use super::credentials::remote_callbacks;
use crate::git::repository::core::{GitRepo, RemoteInfo};

impl GitRepo {
    /// Add a remote repository
    pub fn add_remote(&self, name: &str, url: &str) -> Result<(), Error> {
        self.repo()
            .remote(name, url)
            .context(format!("Failed to add remote '{name}' with URL '{url}'"))?;

        Ok(())
    }

    pub fn has_remote(&self, name: &str) -> Result<bool, Error> {
        Ok(self.get_remotes()?.iter().any(|remote| remote.name == name))
    }

    /// List all remotes with their URLs
    pub fn get_remotes(&self) -> Result<Vec<RemoteInfo>, Error> {
        let remotes = self
            .repo()
            .remotes()
            .context("Failed to get remotes list")?;

        let mut remote_infos = Vec::new();
        for name in remotes.iter().flatten() {
            let remote = self
                .repo()
                .find_remote(name)
                .context(format!("Failed to find remote '{name}'"))?;

            let url = remote.url().unwrap_or("<no url>").to_string();

            remote_infos.push(RemoteInfo {
                name: name.to_string(),
                url,
            });
        }

        Ok(remote_infos)
    }

    /// Get the URL of a specific remote
    pub fn get_remote_url(&self, name: &str) -> Result<String, Error> {
        let remote = self
            .repo()
            .find_remote(name)
            .context(format!("Failed to find remote '{name}'"))?;

        let url = remote
            .url()
            .ok_or_else(|| anyhow::anyhow!("Remote '{name}' has no URL"))?;

        Ok(url.to_string())
    }

    /// Push a local branch to the same name on the remote (`git push <remote> <branch>`).
    /// Rejected ref updates are reported as errors.
    pub fn push(&self, remote_name: &str, branch_name: &str) -> Result<(), Error> {
        let mut remote = self
            .repo()
            .find_remote(remote_name)
            .context(format!("Failed to find remote '{remote_name}'"))?;

        let refspec = format!("refs/heads/{branch_name}:refs/heads/{branch_name}");

        let rejection = RefCell::new(None);
        let mut callbacks = remote_callbacks(self.repo().config()?);
        callbacks.push_update_reference(|reference, status| {
            if let Some(message) = status {
                *rejection.borrow_mut() = Some(format!("{reference}: {message}"));
            }
            Ok(())
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        remote
            .push(&[&refspec], Some(&mut push_options))
            .context(format!(
                "Failed to push branch '{branch_name}' to remote '{remote_name}'"
            ))?;
        drop(push_options);

        if let Some(reason) = rejection.into_inner() {
            return Err(anyhow::anyhow!(
                "Remote '{remote_name}' rejected branch '{branch_name}': {reason}"
            ));
        }

        Ok(())
    }
}
