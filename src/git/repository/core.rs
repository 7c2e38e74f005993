use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Error};
use git2::Repository;

/// Branch every freshly initialized repository starts on
pub const DEFAULT_BRANCH: &str = "main";

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteInfo {
    pub name: String,
    pub url: String,
}

pub struct GitRepo {
    path: PathBuf,
    repo: Repository,
}

impl fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitRepo")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open a git repository at the specified path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            repo: Repository::open(path).context("Cannot open git repo at given path")?,
        })
    }

    /// Whether `path` already holds local git metadata
    pub fn is_initialized<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().join(".git").exists()
    }

    /// Initialize a repository whose HEAD points at the unborn `main` branch
    pub fn init<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path_ref = path.as_ref();

        if Repository::open(path_ref).is_ok() {
            return Err(anyhow::anyhow!("Directory is already a git repository"));
        }

        let repo = Repository::init(path_ref).context("Failed to initialize git repository")?;

        let git_repo = Self {
            path: path_ref.to_path_buf(),
            repo,
        };

        // The branch itself appears with the first commit
        git_repo
            .repo
            .set_head(&format!("refs/heads/{DEFAULT_BRANCH}"))
            .context("Failed to set HEAD to main")?;

        Ok(git_repo)
    }

    /// Initialize a new bare git repository
    pub fn init_bare<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path_ref = path.as_ref();

        if Repository::open(path_ref).is_ok() {
            return Err(anyhow::anyhow!("Directory is already a git repository"));
        }

        let repo =
            Repository::init_bare(path_ref).context("Failed to initialize bare git repository")?;

        let git_repo = Self {
            path: path_ref.to_path_buf(),
            repo,
        };

        git_repo
            .repo
            .set_head(&format!("refs/heads/{DEFAULT_BRANCH}"))
            .context("Failed to set HEAD to main")?;

        Ok(git_repo)
    }

    /// Get the path to the repository
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if this is a bare repository
    pub fn is_bare(&self) -> bool {
        self.repo.is_bare()
    }

    /// Whether HEAD points at a commit yet
    pub fn has_commits(&self) -> bool {
        self.repo.head().is_ok()
    }

    /// Get access to the internal git2 Repository
    pub(crate) fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Stash operations need exclusive access in git2
    pub(crate) fn repo_mut(&mut self) -> &mut Repository {
        &mut self.repo
    }
}
