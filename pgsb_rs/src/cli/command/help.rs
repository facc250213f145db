//! Help text generation for the CLI.

use super::types::Subcommand;
use crate::types::{BINARY_NAME, DEFAULT_SANDBOX_NAME, TEST_FILTER_MARKER};

pub fn format_version() -> String {
    format!("{BINARY_NAME} {}", env!("CARGO_PKG_VERSION"))
}

/// Full usage text. Printed to stdout for `--help` and to stderr after
/// a parse error.
pub fn format_usage() -> String {
    let mut help = String::new();
    help.push_str(&format!(
        "{} - local PostgreSQL sandboxes for Tessera development\n\n",
        format_version()
    ));

    help.push_str("USAGE:\n");
    help.push_str(&format!(
        "    {BINARY_NAME} [nice <cmd>] <subcommand> [options] [-- <subcommand args...>]\n\n"
    ));

    help.push_str("OPTIONS:\n");
    help.push_str("    -h, --help           Show this help\n");
    help.push_str(&format!(
        "    -n, --name <sandbox> Sandbox name (default: {DEFAULT_SANDBOX_NAME})\n"
    ));
    help.push_str("    -p, --port <n>       PostgreSQL port (init: allocated when omitted)\n");
    help.push_str("        --pgver <ver>    PostgreSQL major version to use binaries from\n");
    help.push_str("    -v, --verbose        Echo delegated commands and debug output\n");
    help.push_str("        --version        Show version\n\n");

    help.push_str("SUBCOMMANDS:\n");
    for sub in Subcommand::ALL {
        help.push_str(&format!("    {:<18} {}\n", sub.name(), sub.description()));
    }
    help.push('\n');

    help.push_str("TEST SELECTION:\n");
    help.push_str(&format!(
        "    {BINARY_NAME} test {TEST_FILTER_MARKER} <selector...>      Run only the given tests\n\n"
    ));

    help.push_str("EXIT CODES:\n");
    help.push_str("    0  success\n");
    help.push_str("    1  usage error\n");
    help.push_str("    2  working directory is not the expected Tessera project\n");
    help.push_str("    3  internal argument-count error\n");
    help.push_str("    *  any other code is passed through from the delegated tool\n\n");

    help.push_str("EXAMPLES:\n");
    help.push_str(&format!(
        "    {BINARY_NAME} init                         # sandbox 'default', provisioner auto-detected\n"
    ));
    help.push_str(&format!(
        "    {BINARY_NAME} -n mybox -p 5555 init -- foss\n"
    ));
    help.push_str(&format!(
        "    {BINARY_NAME} nice 'nice -n 19' test {TEST_FILTER_MARKER} storage.wal\n"
    ));
    help.push_str(&format!("    {BINARY_NAME} pgenv -- pg_dump tessera"));

    help
}
