//! Leveled diagnostic lines written to stdout or stderr.
//!
//! Every user-visible message goes through [`Output`], so the prefix,
//! coloring and verbosity gate stay uniform:
//!
//! ```text
//! [pgsb] sandbox ready at /home/me/.pgsb/sandboxes/default
//! [pgsb][warn] step 2/5 failed (exit 1): CREATE DATABASE tessera OWNER tessera
//! [pgsb][error] unknown subcommand 'strat'
//! [pgsb][debug] + /usr/lib/postgresql/16/bin/pg_ctl -D ... start
//! ```

use std::fmt::Display;
use std::io::Write;

use crate::colors::{Painter, Stream};
use crate::types::{BINARY_NAME, ColorMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn tag(self) -> Option<&'static str> {
        match self {
            Level::Debug => Some("debug"),
            Level::Info => None,
            Level::Warn => Some("warn"),
            Level::Error => Some("error"),
        }
    }
}

/// The output channel shared by the parser, dispatcher and executors.
#[derive(Clone, Copy, Debug)]
pub struct Output {
    verbose: bool,
    stdout: Painter,
    stderr: Painter,
}

impl Output {
    pub fn new(verbose: bool, color: ColorMode) -> Self {
        Self {
            verbose,
            stdout: Painter::new(color, Stream::Stdout),
            stderr: Painter::new(color, Stream::Stderr),
        }
    }

    /// Format a line without writing it. Debug lines are formatted even
    /// when not verbose; the gate lives in [`Output::line`].
    pub fn render(&self, level: Level, stream: Stream, msg: &str) -> String {
        let painter = self.painter(stream);
        let prefix = match level.tag() {
            Some(tag) => format!("[{BINARY_NAME}][{tag}]"),
            None => format!("[{BINARY_NAME}]"),
        };
        let prefix = match level {
            Level::Debug => painter.dim(&prefix),
            Level::Info => painter.header(&prefix),
            Level::Warn => painter.warn(&prefix),
            Level::Error => painter.error(&prefix),
        };
        format!("{prefix} {msg}")
    }

    /// Write one leveled line to the chosen stream.
    pub fn line(&self, level: Level, stream: Stream, msg: impl Display) {
        if level == Level::Debug && !self.verbose {
            return;
        }
        let rendered = self.render(level, stream, &msg.to_string());
        self.raw(stream, &rendered);
    }

    /// Write text verbatim (usage, environment listings).
    pub fn raw(&self, stream: Stream, text: &str) {
        // Write errors (closed pipe) are not actionable here.
        let _ = match stream {
            Stream::Stdout => writeln!(std::io::stdout().lock(), "{text}"),
            Stream::Stderr => writeln!(std::io::stderr().lock(), "{text}"),
        };
    }

    pub fn info(&self, msg: impl Display) {
        self.line(Level::Info, Stream::Stdout, msg);
    }

    /// Completion line on stdout with the message painted green.
    pub fn success(&self, msg: impl Display) {
        self.info(self.stdout.ok(&msg.to_string()));
    }

    /// Informational line that must not pollute stdout.
    pub fn note(&self, msg: impl Display) {
        self.line(Level::Info, Stream::Stderr, msg);
    }

    pub fn warn(&self, msg: impl Display) {
        self.line(Level::Warn, Stream::Stderr, msg);
    }

    pub fn error(&self, msg: impl Display) {
        self.line(Level::Error, Stream::Stderr, msg);
    }

    pub fn debug(&self, msg: impl Display) {
        self.line(Level::Debug, Stream::Stderr, msg);
    }

    /// Echo a command line about to run (verbose only).
    pub fn echo_command(&self, command_line: &str) {
        if self.verbose {
            let painted = self.stderr.path(command_line);
            self.line(Level::Debug, Stream::Stderr, format!("+ {painted}"));
        }
    }

    pub fn painter(&self, stream: Stream) -> Painter {
        match stream {
            Stream::Stdout => self.stdout,
            Stream::Stderr => self.stderr,
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new(false, ColorMode::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(verbose: bool) -> Output {
        Output::new(verbose, ColorMode::Never)
    }

    #[test]
    fn test_render_prefixes() {
        let out = plain(false);
        assert_eq!(out.render(Level::Info, Stream::Stdout, "hi"), "[pgsb] hi");
        assert_eq!(
            out.render(Level::Error, Stream::Stderr, "boom"),
            "[pgsb][error] boom"
        );
        assert_eq!(
            out.render(Level::Warn, Stream::Stderr, "careful"),
            "[pgsb][warn] careful"
        );
        assert_eq!(
            out.render(Level::Debug, Stream::Stderr, "x"),
            "[pgsb][debug] x"
        );
    }

    #[test]
    fn test_always_color_paints_prefix() {
        let out = Output::new(false, ColorMode::Always);
        let line = out.render(Level::Error, Stream::Stderr, "boom");
        assert!(line.starts_with(crate::colors::RED));
        assert!(line.ends_with(" boom"));
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_success_paints_message_not_prefix() {
        let out = Output::new(false, ColorMode::Always);
        let msg = out.painter(Stream::Stdout).ok("ready");
        let line = out.render(Level::Info, Stream::Stdout, &msg);
        let painted = format!("{}ready{}", crate::colors::GREEN, crate::colors::RESET);
        assert!(line.ends_with(&painted));
        assert!(line.contains("[pgsb]"));
    }
}
