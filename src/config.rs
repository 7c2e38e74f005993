use std::path::{Path, PathBuf};

use crate::error::{FlowError, Result};

/// Directory created under the user's home when no override is given
pub const DEFAULT_HOME_DIR: &str = ".gitpub";

/// Environment variable that redirects the home cache directory
pub const HOME_PATH_ENV: &str = "CLI_HOME_PATH";

pub const DEFAULT_BUILD_CMD: &str = "npm run build";

pub const DEFAULT_COMMIT_MESSAGE_ATTEMPTS: usize = 5;

pub const DEFAULT_PROMPT_ATTEMPTS: usize = 5;

/// Settings for one invocation, resolved once at the CLI boundary
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub home_path: PathBuf,
    pub refresh_server: bool,
    pub refresh_token: bool,
    pub refresh_owner: bool,
    pub build_cmd: Option<String>,
    /// Hard-reset onto origin/main when the initial merge fails
    pub reset_recovery: bool,
    pub commit_message_attempts: usize,
    /// Retry cap for prompts that insist on a non-empty answer (token)
    pub prompt_attempts: usize,
}

impl FlowConfig {
    pub fn new(home_path: impl Into<PathBuf>) -> Self {
        Self {
            home_path: home_path.into(),
            refresh_server: false,
            refresh_token: false,
            refresh_owner: false,
            build_cmd: None,
            reset_recovery: true,
            commit_message_attempts: DEFAULT_COMMIT_MESSAGE_ATTEMPTS,
            prompt_attempts: DEFAULT_PROMPT_ATTEMPTS,
        }
    }

    pub fn build_cmd(&self) -> &str {
        self.build_cmd
            .as_deref()
            .filter(|cmd| !cmd.trim().is_empty())
            .unwrap_or(DEFAULT_BUILD_CMD)
    }
}

/// Pick the home cache directory: the override if given, else `~/.gitpub`
pub fn default_home_path(home_override: Option<PathBuf>) -> Result<PathBuf> {
    match home_override {
        Some(path) => Ok(path),
        None => dirs::home_dir()
            .map(|home| home.join(DEFAULT_HOME_DIR))
            .ok_or_else(|| FlowError::Configuration("Cannot determine the user home directory".into())),
    }
}

/// Create the home cache directory if missing and confirm it exists afterwards
pub fn ensure_home_path(path: &Path) -> Result<()> {
    log::debug!("home: {}", path.display());

    std::fs::create_dir_all(path).map_err(|e| {
        FlowError::Configuration(format!("Cannot create home directory {}: {e}", path.display()))
    })?;

    if !path.is_dir() {
        return Err(FlowError::Configuration(format!(
            "Home directory {} does not exist",
            path.display()
        )));
    }

    Ok(())
}
