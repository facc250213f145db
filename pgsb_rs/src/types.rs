use serde::Deserialize;

pub const BINARY_NAME: &str = "pgsb";

pub const DEFAULT_SANDBOX_NAME: &str = "default";
pub const DEFAULT_PG_PORT: u16 = 5432;
pub const DEFAULT_PG_VERSION: &str = "16";

/// Database role every delegated process connects as.
pub const DB_USER: &str = "tessera";
pub const SUPERUSER: &str = "postgres";

pub const PRIMARY_DATABASE: &str = "tessera";
pub const MAINTENANCE_DATABASE: &str = "postgres";

pub const ENV_DB_USER: &str = "PGUSER";
pub const ENV_SANDBOX_PATH: &str = "PGSB_SANDBOX";

/// Ends option processing; everything after it is passed through verbatim.
pub const DELIMITER: &str = "--";
pub const TEST_FILTER_MARKER: &str = "--only";

/// Sandboxes provisioned by `init-sync`, in order.
pub const SYNC_SANDBOXES: [&str; 2] = ["sync-a", "sync-b"];
pub const SYNC_INTERVAL_SECS: u64 = 5;

pub const EXIT_USAGE: i32 = 1;
pub const EXIT_WORKDIR: i32 = 2;
pub const EXIT_INTERNAL: i32 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}
