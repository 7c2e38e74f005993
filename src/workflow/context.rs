use std::path::{Path, PathBuf};

use semver::Version;

use crate::error::{FlowError, Result};
use crate::manifest::{normalize_name, PackageManifest};

/// Deployment target carried for the publish step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub user: String,
    pub ip: String,
    pub path: String,
}

/// State of one workflow run, created from `package.json` and updated in
/// place as the version and branch are resolved.
#[derive(Debug, Clone)]
pub struct RepositoryContext {
    /// Package name with `@scope/name` flattened to `scope_name`
    pub name: String,
    pub version: Version,
    pub working_dir: PathBuf,
    pub home_dir: PathBuf,
    /// Development branch, set by version resolution
    pub branch: Option<String>,
    pub build_cmd: String,
    pub prod: bool,
    pub ssh: Option<SshTarget>,
}

impl RepositoryContext {
    pub fn load(working_dir: impl AsRef<Path>, home_dir: impl AsRef<Path>, build_cmd: &str) -> Result<Self> {
        let working_dir = working_dir.as_ref().to_path_buf();
        let manifest = PackageManifest::load(&working_dir)?;

        let name = manifest
            .name()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| FlowError::manifest(manifest.path(), "missing \"name\""))?;
        let raw_version = manifest
            .version()
            .ok_or_else(|| FlowError::manifest(manifest.path(), "missing \"version\""))?;
        let version = Version::parse(raw_version).map_err(|e| {
            FlowError::manifest(manifest.path(), format!("invalid version '{raw_version}': {e}"))
        })?;

        Ok(Self {
            name: normalize_name(name),
            version,
            working_dir,
            home_dir: home_dir.as_ref().to_path_buf(),
            branch: None,
            build_cmd: build_cmd.to_string(),
            prod: false,
            ssh: None,
        })
    }

    pub fn with_publish_target(mut self, prod: bool, ssh: Option<SshTarget>) -> Self {
        self.prod = prod;
        self.ssh = ssh;
        self
    }
}
