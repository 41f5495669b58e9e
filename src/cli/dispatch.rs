use anyhow::Result;

use super::check::cmd_check;
use super::commands::Commands;
use super::context::CliContext;
use super::env::CliArgs;
use super::plan::cmd_plan;
use super::run::{cmd_run, RunAction};

/// Runs the selected command. `Ok(false)` means it ran but did not succeed.
pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<bool> {
    match cli.command.clone() {
        Commands::Today => cmd_run(RunAction::Today, ctx).await,
        Commands::Range(args) => cmd_run(RunAction::Incur(args.start, args.end), ctx).await,
        Commands::Delete(args) => cmd_run(RunAction::Delete(args.start, args.end), ctx).await,
        Commands::Plan(args) => cmd_plan(args, ctx).await,
        Commands::Check => cmd_check(ctx).await,
    }
}
