use anyhow::Result;

use super::{
    CommandKind, CommandResult,
    helper::{discover, finish, load_context},
};
use crate::{cli::args::ScopeCommand, core::pipeline};

pub fn extract(cmd: ScopeCommand) -> Result<CommandResult> {
    let mut ctx = load_context(&cmd.common, cmd.apply)?;
    let scan = discover(&ctx, &cmd.scopes);

    pipeline::extract(&mut ctx, &scan.files);
    pipeline::finish(&mut ctx);

    Ok(finish(CommandKind::Extract, ctx, scan.missing_scopes))
}
