//! new-db and pe-db: ordered SQL steps run one psql call at a time.
//!
//! A failing step is reported and the sequence continues; the overall
//! result fails with the first failing step's exit code once every step
//! has been attempted.

use super::super::RunContext;
use crate::error::{PgsbError, Result};
use crate::launch::ExternalCommand;
use crate::types::{DB_USER, ENV_DB_USER, MAINTENANCE_DATABASE, PRIMARY_DATABASE, SUPERUSER};

pub const AUDIT_DATABASE: &str = "tessera_audit";
pub const EVENTS_DATABASE: &str = "tessera_events";

/// Exit code recorded for a step whose psql could not be launched.
const LAUNCH_FAILED: i32 = 127;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SqlStep {
    pub database: &'static str,
    pub sql: String,
}

impl SqlStep {
    fn new(database: &'static str, sql: impl Into<String>) -> Self {
        Self {
            database,
            sql: sql.into(),
        }
    }

    fn extension(database: &'static str, name: &str) -> Self {
        Self::new(database, format!(r#"CREATE EXTENSION IF NOT EXISTS "{name}""#))
    }
}

pub fn new_db_steps() -> Vec<SqlStep> {
    let mut steps = vec![
        SqlStep::new(
            MAINTENANCE_DATABASE,
            format!("DROP DATABASE IF EXISTS {PRIMARY_DATABASE}"),
        ),
        SqlStep::new(
            MAINTENANCE_DATABASE,
            format!("CREATE DATABASE {PRIMARY_DATABASE} OWNER {DB_USER}"),
        ),
    ];
    steps.extend(
        ["pgcrypto", "uuid-ossp", "pg_trgm"]
            .into_iter()
            .map(|ext| SqlStep::extension(PRIMARY_DATABASE, ext)),
    );
    steps
}

pub fn pe_db_steps() -> Vec<SqlStep> {
    let mut steps: Vec<SqlStep> = [AUDIT_DATABASE, EVENTS_DATABASE]
        .into_iter()
        .map(|db| {
            SqlStep::new(
                MAINTENANCE_DATABASE,
                format!("CREATE DATABASE {db} OWNER {DB_USER}"),
            )
        })
        .collect();
    let extensions: [(&'static str, [&str; 2]); 3] = [
        (PRIMARY_DATABASE, ["pgcrypto", "hstore"]),
        (AUDIT_DATABASE, ["hstore", "btree_gist"]),
        (EVENTS_DATABASE, ["pgcrypto", "btree_gist"]),
    ];
    for (db, names) in extensions {
        steps.extend(names.into_iter().map(|ext| SqlStep::extension(db, ext)));
    }
    steps
}

/// psql invocation for one step; `user` overrides the exported identity.
pub fn step_command(ctx: &RunContext, step: &SqlStep, user: Option<&str>) -> ExternalCommand {
    let cmd = ExternalCommand::new(ctx.pg_bin("psql"))
        .args(["-h".to_string(), ctx.sandbox.path.display().to_string()])
        .args(["-p".to_string(), ctx.effective_port().to_string()])
        .args(["-d", step.database])
        .args(["-v", "ON_ERROR_STOP=1"])
        .args(["-c".to_string(), step.sql.clone()]);
    match user {
        Some(user) => cmd.env(ENV_DB_USER, user),
        None => cmd,
    }
}

/// Attempt every step, then report the aggregate.
pub fn run_steps(ctx: &RunContext, steps: &[SqlStep], user: Option<&str>) -> Result<()> {
    let total = steps.len();
    let mut failed = 0;
    let mut first_code = None;

    for (idx, step) in steps.iter().enumerate() {
        let cmd = step_command(ctx, step, user);
        let code = match ctx.launcher.status(&cmd) {
            Ok(code) => code,
            Err(e) => {
                ctx.output.warn(&e);
                LAUNCH_FAILED
            }
        };
        if code != 0 {
            failed += 1;
            if first_code.is_none() {
                first_code = Some(code);
            }
            ctx.output.warn(format!(
                "step {}/{total} failed (exit {code}): {}",
                idx + 1,
                step.sql
            ));
        }
    }

    match first_code {
        None => Ok(()),
        Some(code) => Err(PgsbError::StepsFailed {
            failed,
            total,
            code,
        }),
    }
}

pub fn new_db(ctx: &RunContext) -> Result<()> {
    run_steps(ctx, &new_db_steps(), Some(SUPERUSER))?;
    ctx.output.info(format!("database {PRIMARY_DATABASE} re-created"));
    Ok(())
}

pub fn pe_db(ctx: &RunContext) -> Result<()> {
    run_steps(ctx, &pe_db_steps(), None)?;
    ctx.output.info(format!(
        "databases {AUDIT_DATABASE} and {EVENTS_DATABASE} created"
    ));
    Ok(())
}
