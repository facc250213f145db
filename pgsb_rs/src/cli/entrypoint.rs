//! Process entry: parse argv, set up logging and config, dispatch, and map
//! the result to an exit code.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::cli::command::{ParseOutcome, format_usage, format_version};
use crate::cli::dispatch::dispatch;
use crate::cli::parser::parse_invocation;
use crate::colors::Stream;
use crate::config::PgsbConfig;
use crate::output::Output;
use crate::types::ColorMode;

/// Env var holding an EnvFilter directive for internal tracing.
pub const ENV_LOG: &str = "PGSB_LOG";

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env(ENV_LOG)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    // A second init (tests driving `run` in-process) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn load_config(project_dir: &Path, vars: &HashMap<String, String>, output: Output) -> PgsbConfig {
    let config = match PgsbConfig::load(project_dir) {
        Ok(config) => config,
        Err(e) => {
            output.warn(format!("{e:#}; using defaults"));
            PgsbConfig::default()
        }
    };
    config.with_env_overrides(vars)
}

/// Run one invocation (argv without the program name) and return the
/// process exit code.
pub fn run(args: &[String]) -> i32 {
    let plain = Output::default();
    let invocation = match parse_invocation(args) {
        Ok(ParseOutcome::ShowHelp) => {
            plain.raw(Stream::Stdout, &format_usage());
            return 0;
        }
        Ok(ParseOutcome::ShowVersion) => {
            plain.raw(Stream::Stdout, &format_version());
            return 0;
        }
        Ok(ParseOutcome::Run(invocation)) => invocation,
        Err(e) => {
            plain.error(&e);
            plain.raw(Stream::Stderr, &format_usage());
            return e.exit_code();
        }
    };

    init_tracing(invocation.global.verbose);

    let project_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let vars: HashMap<String, String> = std::env::vars().collect();
    let early = Output::new(invocation.global.verbose, ColorMode::Auto);
    let config = load_config(&project_dir, &vars, early);
    let output = Output::new(invocation.global.verbose, config.color);
    tracing::debug!(?invocation, dir = %project_dir.display(), "dispatching");

    match dispatch(&invocation, &project_dir, &config, output) {
        Ok(()) => 0,
        Err(e) => {
            output.error(&e);
            if e.shows_usage() {
                output.raw(Stream::Stderr, &format_usage());
            }
            e.exit_code()
        }
    }
}
