mod cli;
mod commands;
mod config;
mod credentials;
mod error;
mod git;
mod hosting;
mod manifest;
mod prompt;
mod tui;
mod workflow;

#[cfg(test)]
mod test_utils;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(format!("gp={level}")),
    )
    .format_timestamp(None)
    .init();

    let result = match &cli.command {
        Commands::Init(args) => commands::init::handle_init(cli.home.clone(), args).await,
        Commands::Commit(args) => commands::commit::handle_commit(cli.home.clone(), args).await,
    };

    if let Err(e) = result {
        tui::report::failure(format!("Error: {e}"));
        std::process::exit(1);
    }
}
