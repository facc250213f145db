//! Terminal color utilities for diagnostic lines.
//!
//! Colors are decided per stream: stdout may be piped while stderr is
//! still a terminal, so each [`Painter`] is bound to the stream it
//! writes to.

use std::io::IsTerminal;

use crate::types::ColorMode;

// ============================================================================
// ANSI Color Codes
// ============================================================================

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const RESET: &str = "\x1b[0m";

/// Which standard stream a line is written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn is_terminal(self) -> bool {
        match self {
            Stream::Stdout => std::io::stdout().is_terminal(),
            Stream::Stderr => std::io::stderr().is_terminal(),
        }
    }
}

/// Determines if colors should be used for `stream` under `mode`.
pub fn is_enabled(mode: ColorMode, stream: Stream) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::env::var_os("NO_COLOR").is_none() && stream.is_terminal(),
    }
}

/// Colorizer bound to one stream.
#[derive(Clone, Copy, Debug)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(mode: ColorMode, stream: Stream) -> Self {
        Self {
            enabled: is_enabled(mode, stream),
        }
    }

    /// Errors - RED
    pub fn error(&self, s: &str) -> String {
        self.wrap(s, RED)
    }

    /// Warnings - YELLOW
    pub fn warn(&self, s: &str) -> String {
        self.wrap(s, YELLOW)
    }

    /// Success - GREEN
    pub fn ok(&self, s: &str) -> String {
        self.wrap(s, GREEN)
    }

    /// Paths and command lines - CYAN
    pub fn path(&self, s: &str) -> String {
        self.wrap(s, CYAN)
    }

    pub fn header(&self, s: &str) -> String {
        self.wrap(s, BOLD)
    }

    /// Debug echo - DIM
    pub fn dim(&self, s: &str) -> String {
        self.wrap(s, DIM)
    }

    pub fn wrap(&self, s: &str, code: &str) -> String {
        if self.enabled {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_painter_disabled() {
        let p = Painter::new(ColorMode::Never, Stream::Stdout);
        assert_eq!(p.error("test"), "test");
        assert_eq!(p.ok("test"), "test");
        assert_eq!(p.path("test"), "test");
    }

    #[test]
    fn test_painter_enabled() {
        let p = Painter { enabled: true };
        assert_eq!(p.error("x"), format!("{RED}x{RESET}"));
        assert_eq!(p.dim("x"), format!("{DIM}x{RESET}"));
        assert_eq!(p.ok("x"), format!("{GREEN}x{RESET}"));
    }

    #[test]
    fn test_mode_overrides_terminal_detection() {
        assert!(is_enabled(ColorMode::Always, Stream::Stdout));
        assert!(!is_enabled(ColorMode::Never, Stream::Stderr));
    }
}
