use anyhow::Result;

use super::{
    CommandKind, CommandResult,
    helper::{discover, finish, load_context},
};
use crate::{cli::args::ScopeCommand, core::pipeline};

/// Rewrite against the stored reference language, then repair.
pub fn rewrite(cmd: ScopeCommand) -> Result<CommandResult> {
    let mut ctx = load_context(&cmd.common, cmd.apply)?;
    let scan = discover(&ctx, &cmd.scopes);

    pipeline::rewrite(&mut ctx, &scan.files, true)?;

    Ok(finish(CommandKind::Rewrite, ctx, scan.missing_scopes))
}
