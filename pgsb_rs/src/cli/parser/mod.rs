//! Command-line parser for `pgsb [nice <cmd>] <subcommand> [options] [-- args]`.
//!
//! # Module Structure
//!
//! - [`core`] - the token state machine producing a [`ParseOutcome`](super::command::ParseOutcome)
//! - [`helpers`] - option values, port parsing, subcommand suggestions

mod core;
mod helpers;

pub use core::parse_invocation;
pub use helpers::suggest_similar_subcommand;
