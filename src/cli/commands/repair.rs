use anyhow::Result;

use super::{
    CommandKind, CommandResult,
    helper::{discover, finish, load_context},
};
use crate::{cli::args::ScopeCommand, core::pipeline};

pub fn repair(cmd: ScopeCommand) -> Result<CommandResult> {
    let mut ctx = load_context(&cmd.common, cmd.apply)?;
    let scan = discover(&ctx, &cmd.scopes);

    pipeline::repair(&mut ctx, &scan.files)?;

    Ok(finish(CommandKind::Repair, ctx, scan.missing_scopes))
}
