pub mod check;
mod command_result;
pub mod extract;
pub mod helper;
pub mod init;
pub mod merge;
pub mod repair;
pub mod rewrite;
pub mod run;

pub use command_result::*;
