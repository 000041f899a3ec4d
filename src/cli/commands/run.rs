use anyhow::Result;

use super::{
    CommandKind, CommandResult,
    helper::{discover, finish, load_context},
};
use crate::{cli::args::ScopeCommand, core::pipeline};

/// The full pipeline over the given scopes.
///
/// Extraction completes for every file before any file is rewritten, so the
/// rewriter sees all keys of the run.
pub fn run(cmd: ScopeCommand) -> Result<CommandResult> {
    let mut ctx = load_context(&cmd.common, cmd.apply)?;
    let scan = discover(&ctx, &cmd.scopes);

    pipeline::extract(&mut ctx, &scan.files);
    pipeline::rewrite(&mut ctx, &scan.files, true)?;
    pipeline::finish(&mut ctx);

    Ok(finish(CommandKind::Run, ctx, scan.missing_scopes))
}
