use std::path::PathBuf;

use console::style;

use super::load;
use crate::cli::BootstrapArgs;
use crate::error::Result;
use crate::hosting::ProviderRegistry;
use crate::prompt::InquirePrompter;
use crate::tui::report;
use crate::workflow::Bootstrap;

pub async fn handle_init(home: Option<PathBuf>, args: &BootstrapArgs) -> Result<()> {
    let (config, context) = load(home, args)?;
    println!(
        "{} Preparing {}",
        style("🚀").cyan().bold(),
        style(&context.name).cyan().bold()
    );

    let prompter = InquirePrompter;
    Bootstrap::new(&config, &prompter)
        .prepare(&ProviderRegistry::with_defaults(), &context)
        .await?;

    report::success("Repository is linked and up to date with origin");
    Ok(())
}
