//! ANSI color helpers for CLI output.
//!
//! Colors are dropped when `NO_COLOR` is set to anything non-empty, or when
//! stdout or stderr is not a terminal, so piped diagnostics stay plain text.

use once_cell::sync::Lazy;
use std::io::IsTerminal;

static ENABLED: Lazy<bool> = Lazy::new(|| {
    let no_color = std::env::var("NO_COLOR").ok();
    should_color(
        no_color.as_deref(),
        std::io::stdout().is_terminal() && std::io::stderr().is_terminal(),
    )
});

/// Whether to emit escape codes, given the `NO_COLOR` value and whether
/// output goes to a terminal.
pub fn should_color(no_color: Option<&str>, terminal: bool) -> bool {
    terminal && !matches!(no_color, Some(v) if !v.is_empty())
}

/// Wrap `s` in the SGR sequence `code` when `enabled`.
pub fn paint(enabled: bool, code: &str, s: &str) -> String {
    if enabled {
        format!("\x1b[{}m{}\x1b[0m", code, s)
    } else {
        s.to_string()
    }
}

/// Format text in green.
pub fn green(s: &str) -> String {
    paint(*ENABLED, "32", s)
}

/// Format text in red.
pub fn red(s: &str) -> String {
    paint(*ENABLED, "31", s)
}

/// Format text in yellow.
pub fn yellow(s: &str) -> String {
    paint(*ENABLED, "33", s)
}

/// Format text in bold.
pub fn bold(s: &str) -> String {
    paint(*ENABLED, "1", s)
}

/// Format text in gray.
pub fn gray(s: &str) -> String {
    paint(*ENABLED, "90", s)
}

/// Format a status label (right-aligned, green, bold).
pub fn status_label(label: &str) -> String {
    paint(*ENABLED, "1;32", &format!("{:>12}", label))
}
