//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.
//! The `write_*` forms take the destination so callers can capture output.

use std::fmt::Display;
use std::io::{self, Write};

use colored::Colorize;

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print plain output (no color, for rendered results)
pub fn info(msg: &(impl Display + ?Sized)) {
    write_info(&mut io::stdout(), msg);
}

// A closed pipe is not worth failing the run over.

/// Write error (red bold "error:" prefix)
pub fn write_error(out: &mut impl Write, msg: &(impl Display + ?Sized)) {
    let _ = writeln!(out, "{}: {}", "error".red().bold(), msg);
}

/// Write an indented hint (dimmed)
pub fn write_hint(out: &mut impl Write, msg: &(impl Display + ?Sized)) {
    let _ = writeln!(out, "  {}", msg.to_string().dimmed());
}

pub fn write_info(out: &mut impl Write, msg: &(impl Display + ?Sized)) {
    let _ = writeln!(out, "{}", msg);
}
