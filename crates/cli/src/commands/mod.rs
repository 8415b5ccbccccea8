//! CLI command implementations.

pub mod catalog;
pub mod product;

use std::io::{self, Write};

use serde::Serialize;

use crate::CliError;

/// Write `value` to stdout as pretty JSON.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
