//! CLI command definitions and help text.
//!
//! - `global`: GlobalOptions shared by all subcommands
//! - `types`: Subcommand enum
//! - `help`: usage text generation
//! - `parsed`: Invocation / ParseOutcome result types

mod global;
mod help;
mod parsed;
mod types;

pub use global::GlobalOptions;
pub use help::{format_usage, format_version};
pub use parsed::{Invocation, ParseOutcome};
pub use types::Subcommand;
