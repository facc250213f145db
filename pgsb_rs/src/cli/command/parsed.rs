//! Invocation - result of command-line argument parsing.

use super::global::GlobalOptions;

/// A fully parsed command line.
///
/// `subcommand` is the raw token; it is checked against the closed
/// [`Subcommand`](super::Subcommand) set by the dispatcher, so an unknown
/// name is reported with a suggestion rather than as a generic parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub subcommand: String,

    pub global: GlobalOptions,

    /// Selectors collected after `--only` (test / integration-test only)
    pub test_filter: Option<Vec<String>>,

    /// Everything after the first `--`, verbatim
    pub trailing: Vec<String>,
}

impl Invocation {
    pub fn new(subcommand: impl Into<String>) -> Self {
        Self {
            subcommand: subcommand.into(),
            global: GlobalOptions::default(),
            test_filter: None,
            trailing: Vec::new(),
        }
    }

    /// Selectors to pass to the test runner (empty when none were given).
    pub fn selectors(&self) -> &[String] {
        self.test_filter.as_deref().unwrap_or(&[])
    }
}

/// What the parser decided the process should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// `-h/--help`: full usage to stdout, exit 0
    ShowHelp,
    /// `--version`: version string to stdout, exit 0
    ShowVersion,
    Run(Invocation),
}
