use anyhow::Result;

use super::{
    CommandKind, CommandResult,
    helper::{finish, load_context},
};
use crate::{cli::args::CheckCommand, core::pipeline};

pub fn check(cmd: CheckCommand) -> Result<CommandResult> {
    let mut ctx = load_context(&cmd.common, false)?;
    pipeline::check(&mut ctx);
    Ok(finish(CommandKind::Check, ctx, Vec::new()))
}
