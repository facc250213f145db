//! Error taxonomy and exit-code mapping.
//!
//! | Variant               | Exit code            | Usage printed |
//! |-----------------------|----------------------|---------------|
//! | `Parse`               | 1                    | yes           |
//! | `UnknownSubcommand`   | 1                    | yes           |
//! | `WorkingDirectory`    | 2                    | no            |
//! | `MissingSandboxConfig`| 2                    | no            |
//! | `ArgCount`            | 3                    | no            |
//! | `ToolFailed`          | child's exit code    | no            |
//! | `StepsFailed`         | first failing code   | no            |
//! | `Io` / `MissingFile`  | 1                    | no            |
//! | `Render`              | 1                    | no            |

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{EXIT_INTERNAL, EXIT_USAGE, EXIT_WORKDIR};

#[derive(Debug, Error)]
pub enum PgsbError {
    #[error("{0}")]
    Parse(String),

    #[error("unknown subcommand '{token}'{}", suggestion_suffix(.suggestion))]
    UnknownSubcommand {
        token: String,
        suggestion: Option<&'static str>,
    },

    #[error("{0}")]
    WorkingDirectory(String),

    #[error("sandbox config {} is missing after provisioning", .0.display())]
    MissingSandboxConfig(PathBuf),

    #[error("{helper} expects {expected} argument(s), got {got}")]
    ArgCount {
        helper: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("{program} exited with status {code}")]
    ToolFailed { program: String, code: i32 },

    #[error("{failed} of {total} steps failed")]
    StepsFailed {
        failed: usize,
        total: usize,
        code: i32,
    },

    #[error("{} not found ({hint})", .path.display())]
    MissingFile { path: PathBuf, hint: &'static str },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to render TOML: {0}")]
    Render(#[from] toml::ser::Error),
}

fn suggestion_suffix(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{s}'?)"),
        None => String::new(),
    }
}

impl PgsbError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Parse(_) | Self::UnknownSubcommand { .. } => EXIT_USAGE,
            Self::WorkingDirectory(_) | Self::MissingSandboxConfig(_) => EXIT_WORKDIR,
            Self::ArgCount { .. } => EXIT_INTERNAL,
            Self::ToolFailed { code, .. } | Self::StepsFailed { code, .. } => *code,
            Self::MissingFile { .. } | Self::Io { .. } | Self::Render(_) => EXIT_USAGE,
        }
    }

    /// Whether the full usage text follows the error line on stderr.
    pub fn shows_usage(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::UnknownSubcommand { .. })
    }
}

pub type Result<T> = std::result::Result<T, PgsbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(PgsbError::parse("x").exit_code(), 1);
        assert_eq!(PgsbError::WorkingDirectory("x".into()).exit_code(), 2);
        assert_eq!(
            PgsbError::ArgCount {
                helper: "edit",
                expected: "0 or 1",
                got: 2
            }
            .exit_code(),
            3
        );
        assert_eq!(
            PgsbError::ToolFailed {
                program: "pg_ctl".into(),
                code: 7
            }
            .exit_code(),
            7
        );
    }

    #[test]
    fn test_toml_render_error_converts() {
        let source = toml::to_string(&1_u8).unwrap_err();
        let err: PgsbError = source.into();
        assert!(matches!(err, PgsbError::Render(_)));
        assert!(err.to_string().starts_with("failed to render TOML"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_unknown_subcommand_message() {
        let err = PgsbError::UnknownSubcommand {
            token: "strat".into(),
            suggestion: Some("start"),
        };
        assert_eq!(
            err.to_string(),
            "unknown subcommand 'strat' (did you mean 'start'?)"
        );
        assert!(err.shows_usage());

        let err = PgsbError::UnknownSubcommand {
            token: "unknown-thing".into(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "unknown subcommand 'unknown-thing'");
    }

    #[test]
    fn test_only_parse_errors_show_usage() {
        assert!(PgsbError::parse("no arguments given").shows_usage());
        assert!(!PgsbError::WorkingDirectory("x".into()).shows_usage());
        assert!(
            !PgsbError::StepsFailed {
                failed: 1,
                total: 5,
                code: 1
            }
            .shows_usage()
        );
    }
}
