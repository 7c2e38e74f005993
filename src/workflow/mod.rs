//! Bootstrap and commit workflows built on top of [`crate::git`].

pub mod bootstrap;
pub mod commit;
pub mod context;
pub mod sync;
pub mod version;

pub use bootstrap::Bootstrap;
pub use commit::CommitWorkflow;
pub use context::{RepositoryContext, SshTarget};
