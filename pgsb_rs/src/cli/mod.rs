//! Command-line interface.
//!
//! ```text
//! argv ──► parser ──► Invocation ──► dispatch ──► handler ──► Launcher
//!                                       │
//!                          detect (variant) + sandbox (context)
//! ```
//!
//! # Module Structure
//!
//! - [`command`] - Subcommand enum, parsed invocation and help text
//! - [`parser`] - Hand-written left-to-right argv parser
//! - [`dispatch`] - Variant gate, run context and per-subcommand handlers
//! - [`entrypoint`] - Exit-code mapping shared by the binary and tests

pub mod command;
pub mod dispatch;
pub mod entrypoint;
pub mod parser;

pub use command::{GlobalOptions, Invocation, ParseOutcome, Subcommand};
pub use dispatch::{RunContext, dispatch};
pub use entrypoint::run;
pub use parser::parse_invocation;
