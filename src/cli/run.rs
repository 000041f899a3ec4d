use super::{
    args::{Arguments, Command},
    commands::{
        CommandResult, check::check, extract::extract, merge::merge, repair::repair,
        rewrite::rewrite, run::run as run_pipeline,
    },
};
use anyhow::{Result, bail};

/// Dispatch a pipeline command. `init` is handled by the caller.
pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Extract(cmd)) => extract(cmd),
        Some(Command::Rewrite(cmd)) => rewrite(cmd),
        Some(Command::Repair(cmd)) => repair(cmd),
        Some(Command::Run(cmd)) => run_pipeline(cmd),
        Some(Command::Merge(cmd)) => merge(cmd),
        Some(Command::Check(cmd)) => check(cmd),
        Some(Command::Init) => bail!("Init command should be handled before run()"),
        None => bail!("No command provided. Use --help to see available commands."),
    }
}
