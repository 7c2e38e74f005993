use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{FlowConfig, HOME_PATH_ENV};
use crate::workflow::SshTarget;

#[derive(Parser)]
#[command(name = "gp")]
#[command(about = "Prepare a package directory for versioned publishing on GitHub or Gitee")]
#[command(version)]
pub struct Cli {
    /// Cache directory for credentials (default: ~/.gitpub)
    #[arg(long, global = true, env = HOME_PATH_ENV)]
    pub home: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or link the remote repository and reconcile local history with it
    Init(BootstrapArgs),
    /// Bootstrap, then resolve the version, commit and push the development branch
    Commit(CommitArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BootstrapArgs {
    /// Ask for the hosting provider again
    #[arg(long)]
    pub refresh_server: bool,

    /// Ask for the access token again
    #[arg(long)]
    pub refresh_token: bool,

    /// Ask for the repository owner again
    #[arg(long)]
    pub refresh_owner: bool,

    /// Component build command (default: npm run build)
    #[arg(long)]
    pub build_cmd: Option<String>,

    /// Fail instead of resetting onto origin/main when the initial merge fails
    #[arg(long)]
    pub no_reset_recovery: bool,

    /// Package directory (default: current directory)
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

impl BootstrapArgs {
    pub fn flow_config(&self, home_path: PathBuf) -> FlowConfig {
        let mut config = FlowConfig::new(home_path);
        config.refresh_server = self.refresh_server;
        config.refresh_token = self.refresh_token;
        config.refresh_owner = self.refresh_owner;
        config.build_cmd = self.build_cmd.clone();
        config.reset_recovery = !self.no_reset_recovery;
        config
    }
}

#[derive(Args, Debug, Clone)]
pub struct CommitArgs {
    #[command(flatten)]
    pub bootstrap: BootstrapArgs,

    /// Production publish
    #[arg(long)]
    pub prod: bool,

    #[arg(long, requires_all = ["ssh_ip", "ssh_path"])]
    pub ssh_user: Option<String>,

    #[arg(long, requires_all = ["ssh_user", "ssh_path"])]
    pub ssh_ip: Option<String>,

    #[arg(long, requires_all = ["ssh_user", "ssh_ip"])]
    pub ssh_path: Option<String>,
}

impl CommitArgs {
    pub fn ssh_target(&self) -> Option<SshTarget> {
        match (&self.ssh_user, &self.ssh_ip, &self.ssh_path) {
            (Some(user), Some(ip), Some(path)) => Some(SshTarget {
                user: user.clone(),
                ip: ip.clone(),
                path: path.clone(),
            }),
            _ => None,
        }
    }
}
