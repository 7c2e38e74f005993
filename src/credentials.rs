use std::path::{Path, PathBuf};

use crate::error::{FlowError, Result};

const CREDENTIAL_DIR: &str = ".git";

/// One cached value under `<home>/.git/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKey {
    Server,
    Token,
    Owner,
    Login,
}

impl CredentialKey {
    pub fn file_name(self) -> &'static str {
        match self {
            CredentialKey::Server => ".git_server",
            CredentialKey::Token => ".git_token",
            CredentialKey::Owner => ".git_own",
            CredentialKey::Login => ".git_login",
        }
    }

    fn is_secret(self) -> bool {
        matches!(self, CredentialKey::Token)
    }
}

/// Small file-backed cache for provider kind, token, owner and login.
///
/// The store performs no validation; callers decide when a value must be
/// re-prompted (absent, or a refresh flag is set).
pub struct CredentialStore {
    root: PathBuf,
}

impl CredentialStore {
    pub fn new<P: AsRef<Path>>(home_path: P) -> Self {
        Self {
            root: home_path.as_ref().join(CREDENTIAL_DIR),
        }
    }

    pub fn path_of(&self, key: CredentialKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    pub fn read(&self, key: CredentialKey) -> Result<Option<String>> {
        let path = self.path_of(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| cache_error("read", &path, e))?;
        let value = content.trim();

        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    pub fn write(&self, key: CredentialKey, value: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root)
            .map_err(|e| cache_error("create", &self.root, e))?;

        let path = self.path_of(key);
        std::fs::write(&path, value).map_err(|e| cache_error("write", &path, e))?;

        if key.is_secret() {
            restrict_permissions(&path)?;
        }

        Ok(path)
    }
}

fn cache_error(action: &str, path: &Path, err: std::io::Error) -> FlowError {
    FlowError::Configuration(format!("Failed to {action} {}: {err}", path.display()))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| cache_error("restrict permissions on", path, e))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_missing_value_is_none() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path());

        assert_eq!(store.read(CredentialKey::Server).unwrap(), None);
    }

    #[test]
    fn write_then_read_each_key_independently() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path());

        store.write(CredentialKey::Server, "github").unwrap();
        store.write(CredentialKey::Login, "octocat").unwrap();

        assert_eq!(store.read(CredentialKey::Server).unwrap().as_deref(), Some("github"));
        assert_eq!(store.read(CredentialKey::Login).unwrap().as_deref(), Some("octocat"));
        assert_eq!(store.read(CredentialKey::Token).unwrap(), None);
        assert!(temp_dir.path().join(".git").join(".git_login").exists());
    }

    #[test]
    fn blank_file_counts_as_absent() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path());

        store.write(CredentialKey::Owner, " \n").unwrap();

        assert_eq!(store.read(CredentialKey::Owner).unwrap(), None);
    }

    #[test]
    fn values_are_trimmed() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path());

        store.write(CredentialKey::Token, "abc123\n").unwrap();

        assert_eq!(store.read(CredentialKey::Token).unwrap().as_deref(), Some("abc123"));
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = assert_fs::TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path());

        let path = store.write(CredentialKey::Token, "secret").unwrap();

        let mode = std::fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
