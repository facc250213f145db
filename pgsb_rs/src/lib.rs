//! # pgsb
//!
//! Local PostgreSQL sandboxes for developing the Tessera service, in both
//! its open and enterprise flavors.
//!
//! A sandbox is a named directory under the sandbox root holding one
//! PostgreSQL data directory, its log and the port files issued when it
//! was created. `pgsb` parses one subcommand per run, checks the project
//! in the working directory when the subcommand needs a specific flavor,
//! and hands off to `pg_ctl`, `psql`, the provisioning scripts or the
//! project's runner with the sandbox environment (`PGUSER`,
//! `PGSB_SANDBOX`) attached.
//!
//! ```bash
//! pgsb init                       # create 'default' and start PostgreSQL
//! pgsb -n mybox -p 5555 init -- foss
//! pgsb test --only storage.wal
//! pgsb pgenv -- pg_dump tessera
//! ```
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use pgsb::cli::{ParseOutcome, parse_invocation};
//!
//! let args: Vec<String> = vec!["-n".into(), "mybox".into(), "psql".into()];
//! if let Ok(ParseOutcome::Run(invocation)) = parse_invocation(&args) {
//!     assert_eq!(invocation.global.sandbox_name, "mybox");
//! }
//! ```

pub mod cli;
pub mod colors;
pub mod config;
pub mod detect;
pub mod error;
pub mod launch;
pub mod output;
pub mod ports;
pub mod sandbox;
pub mod types;

pub use error::{PgsbError, Result};
