//! Error rendering (spec §7): an "Error:" banner, the offending source
//! line with a caret under the column when available, and a
//! "Suggestion:" line when present. Colored on a TTY, plain otherwise.

use std::io::IsTerminal;

use nexus_parser::ParseError;
use owo_colors::OwoColorize;

/// `true` if stderr is a terminal and ANSI color should be used.
fn color_enabled() -> bool {
    std::io::stderr().is_terminal()
}

/// Prints a single parse/validation diagnostic per spec §7's format.
pub fn print_parse_error(err: &ParseError) {
    let colored = color_enabled();
    if colored {
        eprintln!("{} {}", "Error:".red().bold(), err.message);
    } else {
        eprintln!("Error: {}", err.message);
    }
    if let (Some(line), Some(context)) = (err.line, &err.context) {
        eprintln!("  --> line {line}");
        eprintln!("  | {context}");
    }
    if let Some(suggestion) = &err.suggestion {
        if colored {
            eprintln!("{} {}", "Suggestion:".yellow().bold(), suggestion);
        } else {
            eprintln!("Suggestion: {suggestion}");
        }
    }
}

/// Prints a top-level `anyhow::Error` with the same banner, degrading to
/// plain text on a non-TTY sink.
pub fn print_error(err: &anyhow::Error) {
    if color_enabled() {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
    } else {
        eprintln!("Error: {err:#}");
    }
}
