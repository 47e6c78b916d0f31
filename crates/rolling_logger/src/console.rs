//! Console mirror of the log output.

use std::io::{IsTerminal, Write};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const CYAN: &str = "\x1b[36m";

/// Writes records to standard output, ANSI-colored when stdout is a color-capable terminal.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Console {
    color: bool,
}

impl Console {
    pub(crate) fn detect() -> Self {
        Self {
            color: supports_color(),
        }
    }

    #[cfg(test)]
    pub(crate) fn plain() -> Self {
        Self { color: false }
    }

    /// Builds the console line: a bold, level-colored header followed by the message and the
    /// optional call-stack block in cyan.
    pub(crate) fn render(
        &self,
        color: &str,
        header: &str,
        message: &str,
        call_stack: Option<&str>,
    ) -> String {
        let call_stack = call_stack.unwrap_or_default();
        if !self.color {
            return format!("{header} {message}{call_stack}");
        }
        if call_stack.is_empty() {
            format!("{BOLD}{color}{header}{RESET} {message}")
        } else {
            format!("{BOLD}{color}{header}{RESET} {message}{CYAN}{call_stack}{RESET}")
        }
    }

    /// Writes one line. Lines from concurrent callers may interleave with each other, but each
    /// line is written with a single call.
    pub(crate) fn write_line(&self, line: &str) {
        let mut buffer = String::with_capacity(line.len() + 1);
        buffer.push_str(line);
        buffer.push('\n');
        let _ = std::io::stdout().lock().write_all(buffer.as_bytes());
    }
}

fn supports_color() -> bool {
    std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none()
        && std::env::var("TERM").map_or(true, |term| term != "dumb")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rendering_has_no_escape_sequences() {
        let line = Console::plain().render(
            "\x1b[31m",
            "2024-01-01 00:00:00.000000 PID:1 [ERROR] {1} <a.rs:1 f()>",
            "boom",
            Some("\t###CALLSTACK### { }"),
        );
        assert!(!line.contains('\x1b'));
        assert!(line.ends_with("boom\t###CALLSTACK### { }"));
    }

    #[test]
    fn colored_rendering_resets_after_the_header() {
        let console = Console { color: true };
        let line = console.render("\x1b[32m", "[INFO] {1} <a.rs:1 f()>", "hello", None);
        assert_eq!(line, "\x1b[1m\x1b[32m[INFO] {1} <a.rs:1 f()>\x1b[0m hello");
    }
}
