//! Helper functions for command parsing.
//!
//! - Option value extraction
//! - Port parsing
//! - Subcommand suggestion via Levenshtein distance

use strsim::levenshtein;

use crate::cli::command::Subcommand;
use crate::error::{PgsbError, Result};

/// Value following the option at `args[i]`.
pub(super) fn take_value(args: &[String], i: usize) -> Result<&str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| PgsbError::parse(format!("option '{}' requires a value", args[i])))
}

pub(super) fn parse_port(value: &str) -> Result<u16> {
    match value.parse::<u16>() {
        Ok(0) | Err(_) => Err(PgsbError::parse(format!(
            "invalid port '{value}': expected a number between 1 and 65535"
        ))),
        Ok(port) => Ok(port),
    }
}

/// Suggest a similar subcommand name.
/// Returns Some(suggestion) if a close match is found (distance <= 2).
pub fn suggest_similar_subcommand(input: &str) -> Option<&'static str> {
    let input_lower = input.to_lowercase();
    let mut best_match: Option<(&'static str, usize)> = None;

    for sub in Subcommand::ALL {
        let distance = levenshtein(&input_lower, sub.name());
        // Only suggest if distance is small (max 2 for reasonable similarity)
        if distance <= 2 && best_match.is_none_or(|(_, best)| distance < best) {
            best_match = Some((sub.name(), distance));
        }
    }

    best_match.map(|(name, _)| name)
}

// ============================================================================
// Tests
// ============================================================================
