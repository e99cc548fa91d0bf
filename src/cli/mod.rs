//! CLI command definitions and implementations.

pub mod args;
pub mod ask;
pub mod cache;
pub mod keys;
pub mod providers;
pub mod status;
pub mod usage;

pub use args::{Cli, Commands, Output};

use serde::Serialize;

use crate::error::Result;
use crate::render::RobotOutput;

/// Print a command result in the selected output mode.
pub(crate) fn emit<T: Serialize>(
    out: Output,
    command: &str,
    data: &T,
    human: impl FnOnce() -> String,
) -> Result<()> {
    emit_with_errors(out, command, data, Vec::new(), human)
}

/// [`emit`] with robot-mode error strings attached.
pub(crate) fn emit_with_errors<T: Serialize>(
    out: Output,
    command: &str,
    data: &T,
    errors: Vec<String>,
    human: impl FnOnce() -> String,
) -> Result<()> {
    if out.json {
        let rendered = RobotOutput::new(command, data)
            .with_errors(errors)
            .render(out.pretty)?;
        println!("{rendered}");
    } else {
        let text = human();
        println!("{}", text.trim_end());
    }
    Ok(())
}
