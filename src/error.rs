//! Error taxonomy for the bootstrap and commit workflows.
//!
//! Every variant aborts the enclosing workflow step and bubbles up to `main`
//! unmodified. The git layer itself reports `anyhow::Error` with context,
//! which lands in [`FlowError::Git`].

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlowError>;

#[derive(Error, Debug)]
pub enum FlowError {
    /// Home path or hosting provider could not be resolved
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// User or organization lookup failed
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The remote repository neither existed nor could be created
    #[error("Failed to create remote repository '{name}'")]
    RemoteCreation { name: String },

    /// Unresolved merge conflicts in the working tree
    #[error("Unresolved conflicts in {}: resolve and commit them manually, then retry", .paths.join(", "))]
    Conflict { paths: Vec<String> },

    /// Component build missing or not declared publishable
    #[error("Build validation failed: {reason}")]
    BuildValidation { reason: String },

    /// Merging the remote main history failed and could not be recovered
    #[error("Could not reconcile local history with origin/main: {reason}")]
    MergeRecovery { reason: String },

    /// A pull from the remote failed outright
    #[error("Failed to pull remote branch '{branch}': {source}")]
    Pull {
        branch: String,
        #[source]
        source: anyhow::Error,
    },

    /// The next version does not fit in a u64 component
    #[error("Cannot apply a {increment} increment to {version}")]
    VersionOverflow {
        version: semver::Version,
        increment: &'static str,
    },

    /// The user gave up on an empty commit message
    #[error("A non-empty commit message is required (gave up after {attempts} attempts)")]
    CommitMessageRequired { attempts: usize },

    /// A prompt was cancelled or could not be shown
    #[error("Prompt cancelled: {0}")]
    Cancelled(String),

    /// package.json / .componentrc problems
    #[error("Manifest error at {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    /// A hosting provider call failed outright
    #[error("Hosting provider error: {0:#}")]
    Provider(#[source] anyhow::Error),

    #[error("Git error: {0:#}")]
    Git(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlowError {
    pub fn build_validation(reason: impl Into<String>) -> Self {
        Self::BuildValidation {
            reason: reason.into(),
        }
    }

    pub fn manifest(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
