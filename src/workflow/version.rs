//! Version resolution against remote release tags.
//!
//! The highest `release/x.y.z` tag on `origin` decides whether local work can
//! keep its version or has to move past the last release. The outcome is the
//! development branch `dev/<version>` and a `package.json` kept in lock-step.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

use super::context::RepositoryContext;
use crate::error::{FlowError, Result};
use crate::git::GitRepo;
use crate::manifest::PackageManifest;
use crate::prompt::Prompter;

pub const REMOTE: &str = "origin";

static RELEASE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r".+?refs/tags/release/(\d+\.\d+\.\d+)").expect("release ref regex is valid")
});

static DEV_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r".+?refs/heads/dev/(\d+\.\d+\.\d+)").expect("dev ref regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `refs/tags/release/<x.y.z>`
    Release,
    /// `refs/heads/dev/<x.y.z>`
    Development,
}

impl RefKind {
    fn pattern(self) -> &'static Regex {
        match self {
            RefKind::Release => &RELEASE_REF_RE,
            RefKind::Development => &DEV_REF_RE,
        }
    }
}

/// Versions found in an ls-remote listing, highest first.
///
/// Captures that are not valid semver are dropped. Equal versions keep their
/// listing order.
pub fn parse_version_refs<S: AsRef<str>>(lines: &[S], kind: RefKind) -> Vec<Version> {
    let pattern = kind.pattern();
    let mut versions: Vec<Version> = lines
        .iter()
        .filter_map(|line| pattern.captures(line.as_ref()))
        .filter_map(|caps| Version::parse(&caps[1]).ok())
        .collect();

    versions.sort_by(|a, b| b.cmp(a));
    versions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementKind {
    Patch,
    Minor,
    Major,
}

impl IncrementKind {
    pub const ALL: [IncrementKind; 3] = [Self::Patch, Self::Minor, Self::Major];

    pub fn label(self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }

    /// Bump the field, zero the lower ones, drop pre-release and build metadata
    pub fn apply(self, version: &Version) -> Result<Version> {
        let next = match self {
            Self::Patch => version
                .patch
                .checked_add(1)
                .map(|patch| Version::new(version.major, version.minor, patch)),
            Self::Minor => version
                .minor
                .checked_add(1)
                .map(|minor| Version::new(version.major, minor, 0)),
            Self::Major => version
                .major
                .checked_add(1)
                .map(|major| Version::new(major, 0, 0)),
        };

        next.ok_or_else(|| FlowError::VersionOverflow {
            version: version.clone(),
            increment: self.label(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub branch: String,
    pub version: Version,
}

pub fn dev_branch(version: &Version) -> String {
    format!("dev/{version}")
}

/// Pick the working version given the local one and the remote releases
/// (highest first). Prompts for an increment only when local is not ahead.
pub fn resolve(local: &Version, releases: &[Version], prompter: &dyn Prompter) -> Result<Resolution> {
    let Some(latest) = releases.first() else {
        log::debug!("no release tags on remote, keeping {local}");
        return Ok(Resolution {
            branch: dev_branch(local),
            version: local.clone(),
        });
    };

    if local > latest {
        log::debug!("local {local} is ahead of release {latest}");
        return Ok(Resolution {
            branch: dev_branch(local),
            version: local.clone(),
        });
    }

    let options: Vec<String> = IncrementKind::ALL
        .iter()
        .map(|kind| match kind.apply(latest) {
            Ok(next) => format!("{} ({latest} -> {next})", kind.label()),
            Err(_) => format!("{} (unavailable)", kind.label()),
        })
        .collect();
    let choice = prompter.select(
        &format!("Release {latest} already exists, pick the next version"),
        &options,
        0,
    )?;
    let kind = IncrementKind::ALL[choice.min(IncrementKind::ALL.len() - 1)];
    let version = kind.apply(latest)?;

    Ok(Resolution {
        branch: dev_branch(&version),
        version,
    })
}

/// Rewrite `package.json` `version` if it differs; returns whether it changed
pub fn sync_manifest_version(dir: &Path, version: &Version) -> Result<bool> {
    let mut manifest = PackageManifest::load(dir)?;
    let version = version.to_string();
    if manifest.version() == Some(version.as_str()) {
        return Ok(false);
    }

    manifest.set_version(&version);
    manifest.save()?;
    log::info!("package.json version set to {version}");
    Ok(true)
}

/// Resolve against `origin`'s release tags and update the context and
/// `package.json` accordingly
pub fn resolve_context(
    repo: &GitRepo,
    context: &mut RepositoryContext,
    prompter: &dyn Prompter,
) -> Result<Resolution> {
    let refs = repo.list_remote_refs(REMOTE)?;
    let releases = parse_version_refs(&refs, RefKind::Release);
    log::debug!("remote releases: {releases:?}");

    let resolution = resolve(&context.version, &releases, prompter)?;
    context.version = resolution.version.clone();
    context.branch = Some(resolution.branch.clone());
    sync_manifest_version(&context.working_dir, &context.version)?;

    log::debug!("resolved branch {} at {}", resolution.branch, resolution.version);
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::test_utils::{
        create_test_bare_repo, create_test_repo, write_package_json, RepoTestOperations,
    };

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn parse_keeps_only_valid_semver_highest_first() {
        let lines = [
            "aaa\trefs/tags/release/1.2.0",
            "bbb\trefs/tags/release/1.10.0",
            "ccc\trefs/tags/release/01.2.3",
            "ddd\trefs/tags/release/latest",
            "eee\trefs/heads/dev/9.9.9",
            "fff\trefs/tags/release/1.9.0",
        ];

        let releases = parse_version_refs(&lines, RefKind::Release);

        assert_eq!(releases, vec![v("1.10.0"), v("1.9.0"), v("1.2.0")]);
    }

    #[test]
    fn parse_development_refs() {
        let lines = ["aaa\trefs/heads/dev/2.0.0", "bbb\trefs/tags/release/1.0.0"];

        assert_eq!(parse_version_refs(&lines, RefKind::Development), vec![v("2.0.0")]);
    }

    #[test]
    fn increments_zero_lower_fields() {
        let base = v("1.2.3");

        assert_eq!(IncrementKind::Patch.apply(&base).unwrap(), v("1.2.4"));
        assert_eq!(IncrementKind::Minor.apply(&base).unwrap(), v("1.3.0"));
        assert_eq!(IncrementKind::Major.apply(&base).unwrap(), v("2.0.0"));
    }

    #[test]
    fn increment_past_u64_is_an_error() {
        let top = Version::new(u64::MAX, 0, 0);

        assert_eq!(IncrementKind::Minor.apply(&top).unwrap(), Version::new(u64::MAX, 1, 0));
        assert!(matches!(
            IncrementKind::Major.apply(&top),
            Err(FlowError::VersionOverflow { increment: "major", .. })
        ));
    }

    #[test]
    fn overflowing_release_offers_only_valid_increments() {
        let releases = [v("18446744073709551615.0.0")];
        let prompter = ScriptedPrompter::new(["patch", "major (unavailable)"]);

        let resolution = resolve(&v("1.0.0"), &releases, &prompter).unwrap();
        assert_eq!(resolution.version, Version::new(u64::MAX, 0, 1));

        let result = resolve(&v("1.0.0"), &releases, &prompter);
        assert!(matches!(result, Err(FlowError::VersionOverflow { .. })));
    }

    #[test]
    fn no_release_keeps_local_version() {
        let prompter = ScriptedPrompter::default();

        let resolution = resolve(&v("1.0.0"), &[], &prompter).unwrap();

        assert_eq!(resolution.branch, "dev/1.0.0");
        assert_eq!(resolution.version, v("1.0.0"));
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn release_ahead_of_local_prompts_for_increment() {
        let prompter = ScriptedPrompter::new(["minor"]);

        let resolution = resolve(&v("1.0.0"), &[v("1.2.0")], &prompter).unwrap();

        assert_eq!(resolution.branch, "dev/1.3.0");
        assert_eq!(resolution.version, v("1.3.0"));
    }

    #[test]
    fn local_ahead_of_release_keeps_local_version() {
        let prompter = ScriptedPrompter::default();

        let resolution = resolve(&v("2.0.0"), &[v("1.2.0")], &prompter).unwrap();

        assert_eq!(resolution.branch, "dev/2.0.0");
        assert_eq!(resolution.version, v("2.0.0"));
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn equal_release_still_requires_increment() {
        let prompter = ScriptedPrompter::new(["patch"]);

        let resolution = resolve(&v("1.2.0"), &[v("1.2.0")], &prompter).unwrap();

        assert_eq!(resolution.version, v("1.2.1"));
    }

    #[test]
    fn sync_manifest_only_writes_on_change() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        write_package_json(temp_dir.path(), "widgets", "1.0.0");

        assert!(!sync_manifest_version(temp_dir.path(), &v("1.0.0")).unwrap());
        assert!(sync_manifest_version(temp_dir.path(), &v("1.3.0")).unwrap());

        let content = std::fs::read_to_string(temp_dir.path().join("package.json")).unwrap();
        assert_eq!(
            content,
            "{\n  \"name\": \"widgets\",\n  \"version\": \"1.3.0\"\n}\n"
        );
    }

    #[test]
    fn resolve_context_reads_remote_release_tags() {
        let (_remote_dir, remote) = create_test_bare_repo();
        let (local_dir, local) = create_test_repo();
        write_package_json(local_dir.path(), "widgets", "1.0.0");
        local
            .add_file_and_commit("README.md", "hello", "Initial commit")
            .unwrap()
            .add_local_remote("origin", &remote)
            .unwrap();
        local.push("origin", "main").unwrap();

        let head = remote
            .repo()
            .refname_to_id("refs/heads/main")
            .unwrap();
        remote
            .repo()
            .reference("refs/tags/release/1.2.0", head, false, "release")
            .unwrap();

        let mut context = RepositoryContext::load(local_dir.path(), "/tmp/home", "npm run build").unwrap();
        let prompter = ScriptedPrompter::new(["minor"]);

        let resolution = resolve_context(&local, &mut context, &prompter).unwrap();

        assert_eq!(resolution.branch, "dev/1.3.0");
        assert_eq!(context.branch.as_deref(), Some("dev/1.3.0"));
        assert_eq!(context.version, v("1.3.0"));
        let manifest = PackageManifest::load(local_dir.path()).unwrap();
        assert_eq!(manifest.version(), Some("1.3.0"));
    }
}
