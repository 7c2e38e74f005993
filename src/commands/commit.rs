use std::path::PathBuf;

use console::style;

use super::load;
use crate::cli::CommitArgs;
use crate::error::Result;
use crate::hosting::ProviderRegistry;
use crate::prompt::InquirePrompter;
use crate::tui::report;
use crate::workflow::{Bootstrap, CommitWorkflow};

pub async fn handle_commit(home: Option<PathBuf>, args: &CommitArgs) -> Result<()> {
    let (config, context) = load(home, &args.bootstrap)?;
    let mut context = context.with_publish_target(args.prod, args.ssh_target());
    if let Some(ssh) = &context.ssh {
        log::debug!("publish target {}@{}:{}", ssh.user, ssh.ip, ssh.path);
    }

    println!(
        "{} Committing {}",
        style("📦").cyan().bold(),
        style(&context.name).cyan().bold()
    );

    let prompter = InquirePrompter;
    let mut repo = Bootstrap::new(&config, &prompter)
        .prepare(&ProviderRegistry::with_defaults(), &context)
        .await?;

    let resolution = CommitWorkflow::new(&config, &prompter).run(&mut repo, &mut context)?;

    report::success("Development branch pushed");
    report::field("branch", &resolution.branch);
    report::field("version", &resolution.version);
    if context.prod {
        report::field("mode", "production");
    }
    Ok(())
}
