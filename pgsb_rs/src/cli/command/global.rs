//! Utility-level options that apply to every subcommand.

use crate::types::DEFAULT_SANDBOX_NAME;

/// Options consumed before (or around) the subcommand token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalOptions {
    /// Sandbox to operate on (`-n/--name`)
    pub sandbox_name: String,

    /// PostgreSQL port (`-p/--port`); init allocates one when absent
    pub port: Option<u16>,

    /// PostgreSQL major version selecting the binary directory (`--pgver`)
    pub pg_version: Option<String>,

    /// Echo delegated command lines and debug diagnostics (`-v/--verbose`)
    pub verbose: bool,

    /// Priority wrapper from `nice <cmd>`, e.g. `"nice -n 19"`
    pub nice: Option<String>,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            sandbox_name: DEFAULT_SANDBOX_NAME.to_string(),
            port: None,
            pg_version: None,
            verbose: false,
            nice: None,
        }
    }
}
