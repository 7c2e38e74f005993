pub mod commit;
pub mod init;

use std::path::PathBuf;

use crate::cli::BootstrapArgs;
use crate::config::{default_home_path, FlowConfig};
use crate::error::Result;
use crate::workflow::RepositoryContext;

/// Resolve the home path and load the package in `args.dir`
fn load(home: Option<PathBuf>, args: &BootstrapArgs) -> Result<(FlowConfig, RepositoryContext)> {
    let config = args.flow_config(default_home_path(home)?);
    let dir = std::fs::canonicalize(&args.dir)?;
    let context = RepositoryContext::load(&dir, &config.home_path, config.build_cmd())?;
    log::debug!("package {} {} in {}", context.name, context.version, dir.display());
    Ok((config, context))
}
