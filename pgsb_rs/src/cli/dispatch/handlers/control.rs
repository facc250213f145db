//! start, stop, psql, pglog, pgenv, edit.

use std::path::PathBuf;

use super::super::{RunContext, expect_at_most};
use crate::colors::Stream;
use crate::error::{PgsbError, Result};
use crate::launch::ExternalCommand;
use crate::types::PRIMARY_DATABASE;

pub fn start_command(ctx: &RunContext) -> ExternalCommand {
    let sb = ctx.sandbox.path.display().to_string();
    ExternalCommand::new(ctx.pg_bin("pg_ctl"))
        .args(["-D", sb.as_str()])
        .args(["-l".to_string(), ctx.sandbox.log_file().display().to_string()])
        .args([
            "-o".to_string(),
            format!("-k {sb} -p {}", ctx.effective_port()),
        ])
        .arg("start")
        .args(ctx.trailing().iter().cloned())
}

pub fn stop_command(ctx: &RunContext) -> ExternalCommand {
    ExternalCommand::new(ctx.pg_bin("pg_ctl"))
        .args(["-D".to_string(), ctx.sandbox.path.display().to_string()])
        .arg("stop")
        .args(ctx.trailing().iter().cloned())
}

pub fn psql_command(ctx: &RunContext) -> ExternalCommand {
    ExternalCommand::new(ctx.pg_bin("psql"))
        .args(["-h".to_string(), ctx.sandbox.path.display().to_string()])
        .args(["-p".to_string(), ctx.effective_port().to_string()])
        .args(["-d", PRIMARY_DATABASE])
        .args(ctx.trailing().iter().cloned())
}

pub fn pglog_command(ctx: &RunContext) -> ExternalCommand {
    let cmd = ExternalCommand::new("tail");
    let cmd = if ctx.trailing().is_empty() {
        cmd.arg("-f")
    } else {
        cmd.args(ctx.trailing().iter().cloned())
    };
    cmd.arg(ctx.sandbox.log_file().display().to_string())
}

pub fn start(ctx: &RunContext) -> Result<()> {
    ctx.launcher.run(&start_command(ctx))
}

pub fn stop(ctx: &RunContext) -> Result<()> {
    ctx.launcher.run(&stop_command(ctx))
}

pub fn psql(ctx: &RunContext) -> Result<()> {
    ctx.launcher.run(&psql_command(ctx))
}

pub fn pglog(ctx: &RunContext) -> Result<()> {
    let log = ctx.sandbox.log_file();
    if !log.exists() {
        return Err(PgsbError::MissingFile {
            path: log,
            hint: "run `pgsb init` or `pgsb start` first",
        });
    }
    ctx.launcher.run(&pglog_command(ctx))
}

/// `KEY=VALUE` lines of the exported environment, sorted by key.
pub fn environment_listing(ctx: &RunContext) -> Vec<String> {
    ctx.launcher
        .base_env()
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect()
}

pub fn pgenv(ctx: &RunContext) -> Result<()> {
    let Some((program, args)) = ctx.trailing().split_first() else {
        for line in environment_listing(ctx) {
            ctx.output.raw(Stream::Stdout, &line);
        }
        return Ok(());
    };
    ctx.launcher
        .run(&ExternalCommand::new(program).args(args.iter().cloned()))
}

/// File `edit` opens: the named sandbox file, else `pe.toml` when it
/// exists, else `postgresql.conf`.
pub fn edit_target(ctx: &RunContext) -> Result<PathBuf> {
    expect_at_most("edit", ctx.trailing(), 1, "0 or 1")?;
    if let Some(file) = ctx.trailing().first() {
        return Ok(ctx.sandbox.path.join(file));
    }
    let pe = ctx.sandbox.pe_config();
    if pe.exists() {
        Ok(pe)
    } else {
        Ok(ctx.sandbox.pg_config())
    }
}

pub fn edit(ctx: &RunContext) -> Result<()> {
    let target = edit_target(ctx)?;
    let editor = ctx.config.editor();
    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| PgsbError::parse("editor command is empty"))?;
    let cmd = ExternalCommand::new(program)
        .args(parts)
        .arg(target.display().to_string());
    ctx.launcher.run(&cmd)
}
