use anyhow::Result;

mod args;
mod commands;
mod exit_status;
mod report;
mod run;

pub use args::{Arguments, Command, CommonArgs};
pub use exit_status::ExitStatus;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let verbose = args.verbose();
    let json = args.json();

    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };
    if matches!(args.command, Some(Command::Init)) {
        return commands::init::init();
    }

    let result = run::run(args)?;
    if json {
        report::print_json(&result)?;
    } else {
        report::print(&result, verbose);
    }

    Ok(if result.has_issues() {
        ExitStatus::Failure
    } else {
        ExitStatus::Success
    })
}
