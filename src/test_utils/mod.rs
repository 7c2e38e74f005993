#[cfg(test)]
pub mod fake_provider;

#[cfg(test)]
pub mod repo_extensions;

#[cfg(test)]
pub use fake_provider::FakeProvider;

#[cfg(test)]
pub use repo_extensions::{
    create_test_bare_repo, create_test_repo, write_package_json, RepoAssertions,
    RepoTestOperations,
};
