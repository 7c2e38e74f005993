//! Git operations module
//!
//! Thin, domain-grouped wrappers over `git2` used by the workflows:
//!
//! - `repository`: open/init, signatures
//! - `branches`: list, create, checkout
//! - `commits`: stage and commit
//! - `status`: working-tree snapshot
//! - `stash`: list and pop stashes
//! - `remotes`: add, push, fetch, pull, list remote refs
//! - `merge`: merges (unrelated histories included) and hard resets

pub mod branches;
pub mod commits;
pub mod merge;
pub mod remotes;
pub mod repository;
pub mod stash;
pub mod status;

pub use merge::operations::MergeOutcome;
pub use repository::core::GitRepo;
