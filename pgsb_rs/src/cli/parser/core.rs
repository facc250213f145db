//! Core parsing logic: a single left-to-right pass over argv.
//!
//! Rules, in priority order, each consuming one or two tokens:
//!
//! 1. `--` ends option processing; the rest becomes `trailing` verbatim
//! 2. `-h/--help` aborts with [`ParseOutcome::ShowHelp`]
//! 3. `-v/--verbose`
//! 4. `-n/--name <sandbox>`
//! 5. `-p/--port <n>`
//! 6. `--pgver <version>`
//! 7. `--version` aborts with [`ParseOutcome::ShowVersion`]
//! 8. `nice <cmd>` stores a priority wrapper
//! 9. `--only` (after `test`/`integration-test`) collects selectors up to `--`
//! 10. anything else is the subcommand, or an error if one was already seen

use super::super::command::{GlobalOptions, Invocation, ParseOutcome, Subcommand};
use super::helpers::{parse_port, take_value};
use crate::error::{PgsbError, Result};
use crate::sandbox::validate_name;
use crate::types::{DELIMITER, TEST_FILTER_MARKER};

/// Parse the argument vector (without the program name).
pub fn parse_invocation(args: &[String]) -> Result<ParseOutcome> {
    if args.is_empty() {
        return Err(PgsbError::parse("no arguments given"));
    }

    let mut global = GlobalOptions::default();
    let mut subcommand: Option<String> = None;
    let mut test_filter: Option<Vec<String>> = None;
    let mut trailing: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();

        match arg {
            DELIMITER => {
                trailing.extend_from_slice(&args[i + 1..]);
                break;
            }
            "-h" | "--help" => return Ok(ParseOutcome::ShowHelp),
            "-v" | "--verbose" => {
                global.verbose = true;
                i += 1;
            }
            "-n" | "--name" => {
                let name = take_value(args, i)?;
                validate_name(name).map_err(PgsbError::Parse)?;
                global.sandbox_name = name.to_string();
                i += 2;
            }
            "-p" | "--port" => {
                global.port = Some(parse_port(take_value(args, i)?)?);
                i += 2;
            }
            "--pgver" => {
                let version = take_value(args, i)?;
                if version.trim().is_empty() {
                    return Err(PgsbError::parse("--pgver requires a non-empty version"));
                }
                global.pg_version = Some(version.to_string());
                i += 2;
            }
            "--version" => return Ok(ParseOutcome::ShowVersion),
            "nice" => {
                let wrapper = take_value(args, i)?;
                if wrapper.trim().is_empty() {
                    return Err(PgsbError::parse("nice requires a wrapper command"));
                }
                global.nice = Some(wrapper.to_string());
                i += 2;
            }
            TEST_FILTER_MARKER => {
                check_filter_allowed(subcommand.as_deref())?;
                let rest = &args[i + 1..];
                let end = rest
                    .iter()
                    .position(|a| a == DELIMITER)
                    .unwrap_or(rest.len());
                test_filter
                    .get_or_insert_with(Vec::new)
                    .extend_from_slice(&rest[..end]);
                i += 1 + end;
            }
            _ => {
                if let Some(existing) = &subcommand {
                    return Err(PgsbError::parse(format!(
                        "unknown argument '{arg}' (subcommand '{existing}' already given)"
                    )));
                }
                subcommand = Some(arg.to_string());
                i += 1;
            }
        }
    }

    let subcommand = subcommand.ok_or_else(|| PgsbError::parse("no subcommand given"))?;
    Ok(ParseOutcome::Run(Invocation {
        subcommand,
        global,
        test_filter,
        trailing,
    }))
}

fn check_filter_allowed(subcommand: Option<&str>) -> Result<()> {
    match subcommand {
        Some(token) if Subcommand::from_token(token).is_some_and(|s| s.accepts_test_filter()) => {
            Ok(())
        }
        Some(token) => Err(PgsbError::parse(format!(
            "'{token}' does not accept {TEST_FILTER_MARKER}; only test and integration-test do"
        ))),
        None => Err(PgsbError::parse(format!(
            "{TEST_FILTER_MARKER} must follow test or integration-test"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn parse(v: &[&str]) -> Result<ParseOutcome> {
        parse_invocation(&args(v))
    }

    fn invocation(v: &[&str]) -> Invocation {
        match parse(v) {
            Ok(ParseOutcome::Run(inv)) => inv,
            other => panic!("expected invocation for {v:?}, got {other:?}"),
        }
    }

    fn parse_error(v: &[&str]) -> String {
        match parse(v) {
            Err(err) => {
                assert_eq!(err.exit_code(), 1);
                assert!(err.shows_usage());
                err.to_string()
            }
            Ok(other) => panic!("expected parse error for {v:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_no_arguments() {
        assert_eq!(parse_error(&[]), "no arguments given");
    }

    #[test]
    fn test_simple_subcommand_uses_defaults() {
        let inv = invocation(&["start"]);
        assert_eq!(inv.subcommand, "start");
        assert_eq!(inv.global, GlobalOptions::default());
        assert_eq!(inv.global.sandbox_name, "default");
        assert!(inv.test_filter.is_none());
        assert!(inv.trailing.is_empty());
    }

    #[test]
    fn test_options_before_and_after_subcommand() {
        let inv = invocation(&["-n", "mybox", "init", "-p", "5555", "--pgver", "15", "-v"]);
        assert_eq!(inv.subcommand, "init");
        assert_eq!(inv.global.sandbox_name, "mybox");
        assert_eq!(inv.global.port, Some(5555));
        assert_eq!(inv.global.pg_version.as_deref(), Some("15"));
        assert!(inv.global.verbose);
    }

    #[test]
    fn test_long_option_names() {
        let inv = invocation(&["--name", "x", "--port", "6000", "--verbose", "psql"]);
        assert_eq!(inv.global.sandbox_name, "x");
        assert_eq!(inv.global.port, Some(6000));
        assert!(inv.global.verbose);
    }

    #[test]
    fn test_delimiter_passes_everything_through() {
        let inv = invocation(&["init", "--", "foss", "-h", "--version", "-n", "x", "--", "init"]);
        assert_eq!(
            inv.trailing,
            args(&["foss", "-h", "--version", "-n", "x", "--", "init"])
        );
        assert_eq!(inv.global.sandbox_name, "default");
    }

    #[test]
    fn test_trailing_is_verbatim_for_many_shapes() {
        let tails: [&[&str]; 5] = [
            &[],
            &["--"],
            &["--only", "a"],
            &["pgenv", "psql", "-c", "select 1"],
            &["-p", "notaport", "nice"],
        ];
        for tail in tails {
            let mut v = vec!["pgenv", "--"];
            v.extend_from_slice(tail);
            let inv = invocation(&v);
            assert_eq!(inv.trailing, args(tail), "tail {tail:?}");
        }
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse(&["-h"]).ok(), Some(ParseOutcome::ShowHelp));
        assert_eq!(parse(&["init", "--help"]).ok(), Some(ParseOutcome::ShowHelp));
        assert_eq!(parse(&["--version"]).ok(), Some(ParseOutcome::ShowVersion));
        // help wins even after a would-be error token
        assert_eq!(
            parse(&["start", "--help", "stop"]).ok(),
            Some(ParseOutcome::ShowHelp)
        );
    }

    #[test]
    fn test_help_after_delimiter_is_trailing() {
        let inv = invocation(&["pgenv", "--", "--help"]);
        assert_eq!(inv.trailing, args(&["--help"]));
    }

    #[test]
    fn test_two_subcommands_is_error() {
        let pairs = [
            ("start", "stop"),
            ("init", "init"),
            ("test", "unknown-thing"),
            ("foo", "bar"),
        ];
        for (a, b) in pairs {
            let msg = parse_error(&[a, b]);
            assert!(msg.contains(&format!("unknown argument '{b}'")), "{msg}");
        }
    }

    #[test]
    fn test_nice_wrapper() {
        let inv = invocation(&["nice", "nice -n 19", "test"]);
        assert_eq!(inv.global.nice.as_deref(), Some("nice -n 19"));
        assert_eq!(inv.subcommand, "test");
    }

    #[test]
    fn test_nice_is_not_the_subcommand() {
        assert_eq!(parse_error(&["nice", "ionice"]), "no subcommand given");
    }

    #[test]
    fn test_missing_option_values() {
        assert_eq!(parse_error(&["init", "-n"]), "option '-n' requires a value");
        assert_eq!(
            parse_error(&["init", "--port"]),
            "option '--port' requires a value"
        );
        assert_eq!(
            parse_error(&["nice"]),
            "option 'nice' requires a value"
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(parse_error(&["-p", "abc", "start"]).contains("invalid port"));
        assert!(parse_error(&["-n", "../etc", "init"]).contains("invalid sandbox name"));
        assert!(parse_error(&["-n", "", "init"]).contains("must not be empty"));
    }

    #[test]
    fn test_only_collects_selectors() {
        let inv = invocation(&["test", "--only", "storage.wal", "api.auth"]);
        assert_eq!(
            inv.test_filter,
            Some(args(&["storage.wal", "api.auth"]))
        );
        assert!(inv.trailing.is_empty());
        assert_eq!(inv.selectors(), &args(&["storage.wal", "api.auth"])[..]);
    }

    #[test]
    fn test_only_stops_at_delimiter() {
        let inv = invocation(&["integration-test", "--only", "a", "-v", "--", "--fail-fast"]);
        assert_eq!(inv.test_filter, Some(args(&["a", "-v"])));
        assert_eq!(inv.trailing, args(&["--fail-fast"]));
        assert!(!inv.global.verbose);
    }

    #[test]
    fn test_only_with_no_selectors() {
        let inv = invocation(&["test", "--only"]);
        assert_eq!(inv.test_filter, Some(vec![]));
    }

    #[test]
    fn test_only_rejected_for_other_subcommands() {
        for sub in Subcommand::ALL.into_iter().filter(|s| !s.accepts_test_filter()) {
            let msg = parse_error(&[sub.name(), "--only", "x"]);
            assert!(msg.contains("does not accept --only"), "{msg}");
        }
    }

    #[test]
    fn test_only_before_subcommand_is_error() {
        assert_eq!(
            parse_error(&["--only", "x", "test"]),
            "--only must follow test or integration-test"
        );
    }

    #[test]
    fn test_unknown_subcommand_is_accepted_by_parser() {
        let inv = invocation(&["unknown-thing"]);
        assert_eq!(inv.subcommand, "unknown-thing");
    }

    #[test]
    fn test_options_only_is_missing_subcommand() {
        assert_eq!(parse_error(&["-v", "-n", "box"]), "no subcommand given");
        assert_eq!(parse_error(&["--", "init"]), "no subcommand given");
    }
}
