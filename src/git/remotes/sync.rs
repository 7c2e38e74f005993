use anyhow::{Context, Error};
use git2::{AutotagOption, FetchOptions, FetchPrune};

use super::credentials::remote_callbacks;
use crate::git::{merge::operations::MergeOutcome, repository::core::GitRepo};

/// Local namespace holding the last listing of each remote's refs
const REMOTE_REFS_NAMESPACE: &str = "refs/gitpub/remote-refs";

impl GitRepo {
    /// Fetch changes from a remote repository
    pub fn fetch(&self, remote_name: &str, branch_name: Option<&str>) -> Result<String, Error> {
        let mut remote = self
            .repo()
            .find_remote(remote_name)
            .context(format!("Remote '{remote_name}' not found"))?;

        let refspecs = match branch_name {
            Some(branch) => {
                vec![format!(
                    "refs/heads/{branch}:refs/remotes/{remote_name}/{branch}"
                )]
            }
            None => {
                let refspecs = remote
                    .fetch_refspecs()
                    .context("Failed to get remote refspecs")?;

                refspecs.iter().flatten().map(str::to_string).collect()
            }
        };

        let refspecs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(self.repo().config()?));

        remote
            .fetch(&refspecs, Some(&mut fetch_options), None)
            .context("Failed to fetch from remote")?;

        let stats = remote.stats();
        let received_objects = stats.received_objects();
        let total_objects = stats.total_objects();

        if received_objects > 0 {
            Ok(format!(
                "Fetched {received_objects}/{total_objects} objects from {remote_name}"
            ))
        } else {
            Ok("Already up-to-date".to_string())
        }
    }

    /// Pull changes from a remote repository (fetch + merge into the current branch).
    ///
    /// Conflicts do not fail the pull; they are returned as
    /// [`MergeOutcome::Conflicts`] and left in the working tree.
    pub fn pull(&self, remote_name: &str, branch_name: Option<&str>) -> Result<MergeOutcome, Error> {
        let current_branch = self
            .get_current_branch()
            .context("Failed to get current branch")?;
        let target_branch = branch_name.unwrap_or(&current_branch);

        self.fetch(remote_name, Some(target_branch))
            .context("Failed to fetch from remote")?;

        let remote_branch = format!("{remote_name}/{target_branch}");
        let remote_commit = self
            .repo()
            .revparse_single(&format!("refs/remotes/{remote_branch}"))
            .context(format!(
                "Remote branch '{remote_branch}' not found after fetch"
            ))?
            .peel_to_commit()
            .context("Failed to get remote commit")?;

        self.merge_commit(
            &remote_commit,
            &format!("Merge branch '{remote_branch}' into {current_branch}"),
        )
    }

    /// Branch and tag refs of a remote, one `<oid>\t<refname>` line each
    /// (`git ls-remote --refs --heads --tags`).
    ///
    /// git2 cannot list an empty advertisement, so the refs are mirrored
    /// under `REMOTE_REFS_NAMESPACE` by a pruning fetch and read back.
    pub fn list_remote_refs(&self, remote_name: &str) -> Result<Vec<String>, Error> {
        let mut remote = self
            .repo()
            .find_remote(remote_name)
            .context(format!("Remote '{remote_name}' not found"))?;

        let mirror = format!("{REMOTE_REFS_NAMESPACE}/{remote_name}");
        let refspecs = [
            format!("+refs/heads/*:{mirror}/heads/*"),
            format!("+refs/tags/*:{mirror}/tags/*"),
        ];

        let mut fetch_options = FetchOptions::new();
        fetch_options
            .remote_callbacks(remote_callbacks(self.repo().config()?))
            .download_tags(AutotagOption::None)
            .prune(FetchPrune::On);

        remote
            .fetch(&refspecs, Some(&mut fetch_options), None)
            .context(format!("Failed to list refs of remote '{remote_name}'"))?;

        let prefix = format!("{mirror}/");
        let mut refs = Vec::new();
        for reference in self
            .repo()
            .references_glob(&format!("{mirror}/*"))
            .context("Failed to read mirrored remote refs")?
        {
            let reference = reference.context("Failed to read mirrored remote ref")?;
            let (Some(name), Some(oid)) = (reference.name(), reference.target()) else {
                continue;
            };
            if let Some(short) = name.strip_prefix(&prefix) {
                refs.push(format!("{oid}\trefs/{short}"));
            }
        }

        Ok(refs)
    }

    /// Whether the remote advertises `refs/heads/<branch>`
    pub fn remote_has_branch(&self, remote_name: &str, branch: &str) -> Result<bool, Error> {
        let wanted = format!("refs/heads/{branch}");
        Ok(self
            .list_remote_refs(remote_name)?
            .iter()
            .any(|line| line.split('\t').nth(1) == Some(wanted.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use crate::git::merge::operations::MergeOutcome;
    use crate::test_utils::{
        create_test_bare_repo, create_test_repo, RepoAssertions, RepoTestOperations,
    };

    #[test]
    fn fetch_works() {
        let (_remote_dir, remote_repo) = create_test_bare_repo();

        let (_local_dir, local_repo) = create_test_repo();
        local_repo
            .add_file_and_commit("README.md", "initial", "Initial commit")
            .unwrap();
        local_repo.add_local_remote("origin", &remote_repo).unwrap();
        local_repo.push("origin", "main").unwrap();

        let result = local_repo.fetch("origin", Some("main")).unwrap();
        assert!(result.contains("Fetched") || result.contains("up-to-date"));

        let result = local_repo.fetch("origin", None).unwrap();
        assert!(result.contains("Fetched") || result.contains("up-to-date"));

        assert!(local_repo.fetch("nonexistent", None).is_err());
    }

    #[test]
    fn pull_fast_forwards_from_another_clone() {
        let (_remote_dir, remote_repo) = create_test_bare_repo();

        let (_first_dir, first) = create_test_repo();
        first
            .add_file_and_commit("README.md", "initial", "Initial commit")
            .unwrap();
        first.add_local_remote("origin", &remote_repo).unwrap();
        first.push("origin", "main").unwrap();

        let (_second_dir, second) = create_test_repo();
        second.add_local_remote("origin", &remote_repo).unwrap();
        second.pull("origin", Some("main")).unwrap();
        second.assert_file_exists("README.md");

        first
            .add_file_and_commit("new_file.txt", "new content", "Add new file")
            .unwrap();
        first.push("origin", "main").unwrap();

        let result = second.pull("origin", Some("main")).unwrap();
        assert!(matches!(result, MergeOutcome::FastForward(_)));
        second.assert_file_exists("new_file.txt");

        assert_eq!(second.pull("origin", Some("main")).unwrap(), MergeOutcome::UpToDate);
        assert!(second.pull("nonexistent", None).is_err());
    }

    #[test]
    fn pull_leaves_conflicts_for_the_caller() {
        let (_remote_dir, remote_repo) = create_test_bare_repo();

        let (_first_dir, first) = create_test_repo();
        first.add_file_and_commit("a.js", "base", "Base").unwrap();
        first.add_local_remote("origin", &remote_repo).unwrap();
        first.push("origin", "main").unwrap();

        let (_second_dir, second) = create_test_repo();
        second.add_local_remote("origin", &remote_repo).unwrap();
        second.pull("origin", Some("main")).unwrap();

        first.add_file_and_commit("a.js", "theirs", "Theirs").unwrap();
        first.push("origin", "main").unwrap();
        second.add_file_and_commit("a.js", "ours", "Ours").unwrap();

        let result = second.pull("origin", Some("main")).unwrap();

        assert_eq!(result, MergeOutcome::Conflicts(vec!["a.js".to_string()]));
        assert!(second.status().unwrap().has_conflicts());
    }

    #[test]
    fn list_remote_refs_reports_branches() {
        let (_remote_dir, remote_repo) = create_test_bare_repo();

        let (_local_dir, local_repo) = create_test_repo();
        local_repo
            .add_file_and_commit("README.md", "initial", "Initial commit")
            .unwrap();
        local_repo.add_local_remote("origin", &remote_repo).unwrap();
        local_repo.push("origin", "main").unwrap();
        local_repo.create_and_checkout_branch("dev/1.0.0").unwrap();
        local_repo.push("origin", "dev/1.0.0").unwrap();

        let refs = local_repo.list_remote_refs("origin").unwrap();

        assert!(refs.iter().any(|line| line.ends_with("\trefs/heads/main")));
        assert!(refs.iter().any(|line| line.ends_with("\trefs/heads/dev/1.0.0")));
        assert!(refs.iter().all(|line| !line.ends_with("\tHEAD")));
        assert!(local_repo.remote_has_branch("origin", "main").unwrap());
        assert!(!local_repo.remote_has_branch("origin", "dev/2.0.0").unwrap());
    }

    #[test]
    fn list_remote_refs_of_empty_remote_is_empty() {
        let (_remote_dir, remote_repo) = create_test_bare_repo();
        let (_local_dir, local_repo) = create_test_repo();
        local_repo.add_local_remote("origin", &remote_repo).unwrap();

        assert!(local_repo.list_remote_refs("origin").unwrap().is_empty());
        assert!(!local_repo.remote_has_branch("origin", "main").unwrap());
        assert!(local_repo.list_remote_refs("nonexistent").is_err());
    }

    #[test]
    fn list_remote_refs_reports_tags_and_drops_deleted_branches() {
        let (_remote_dir, remote_repo) = create_test_bare_repo();
        let (_local_dir, local_repo) = create_test_repo();
        local_repo
            .add_file_and_commit("README.md", "initial", "Initial commit")
            .unwrap();
        local_repo.add_local_remote("origin", &remote_repo).unwrap();
        local_repo.push("origin", "main").unwrap();
        local_repo.create_and_checkout_branch("dev/1.0.0").unwrap();
        local_repo.push("origin", "dev/1.0.0").unwrap();
        assert!(local_repo.remote_has_branch("origin", "dev/1.0.0").unwrap());

        let head = remote_repo.repo().refname_to_id("refs/heads/main").unwrap();
        remote_repo
            .repo()
            .reference("refs/tags/release/1.0.0", head, false, "release")
            .unwrap();
        remote_repo
            .repo()
            .find_reference("refs/heads/dev/1.0.0")
            .unwrap()
            .delete()
            .unwrap();

        let refs = local_repo.list_remote_refs("origin").unwrap();

        assert!(refs.contains(&format!("{head}\trefs/tags/release/1.0.0")));
        assert!(refs.contains(&format!("{head}\trefs/heads/main")));
        assert!(!local_repo.remote_has_branch("origin", "dev/1.0.0").unwrap());
        assert!(local_repo.repo().find_reference("refs/tags/release/1.0.0").is_err());
    }
}
