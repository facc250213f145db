//! Delegation to the project's build/test runner: run, test,
//! integration-test, repl, benchmark, clean, and the extension build.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::super::RunContext;
use crate::detect::ProjectVariant;
use crate::error::{PgsbError, Result};
use crate::launch::ExternalCommand;
use crate::sandbox::read_port_file;
use crate::types::{DB_USER, PRIMARY_DATABASE};

/// Contents of the generated enterprise `benchmark.toml`.
#[derive(Debug, Serialize)]
struct BenchmarkConfig {
    sandbox: String,
    log_file: String,
    service_config: String,
    endpoint: String,
}

fn runner(ctx: &RunContext, verb: &str) -> ExternalCommand {
    ExternalCommand::new(ctx.project_path(&ctx.config.runner)).arg(verb)
}

/// Service config for the detected variant.
pub fn service_config(ctx: &RunContext) -> Result<PathBuf> {
    match ctx.variant.require_known()? {
        ProjectVariant::Enterprise => Ok(ctx.sandbox.pe_config()),
        _ => Ok(ctx.project_path(&ctx.config.open_service_config)),
    }
}

fn with_config(cmd: ExternalCommand, config: PathBuf) -> ExternalCommand {
    cmd.args(["--config".to_string(), config.display().to_string()])
}

pub fn run_command(ctx: &RunContext) -> Result<ExternalCommand> {
    Ok(with_config(runner(ctx, "service"), service_config(ctx)?)
        .args(ctx.trailing().iter().cloned()))
}

pub fn test_command(ctx: &RunContext) -> Result<ExternalCommand> {
    let mut cmd = runner(ctx, "test");
    if ctx.variant.require_known()? == ProjectVariant::Enterprise {
        cmd = with_config(cmd, ctx.sandbox.pe_config());
    }
    Ok(cmd
        .args(ctx.invocation.selectors().iter().cloned())
        .args(ctx.trailing().iter().cloned()))
}

pub fn integration_test_command(ctx: &RunContext) -> Result<ExternalCommand> {
    ctx.variant.require_open()?;
    Ok(runner(ctx, "integration-test")
        .args(ctx.invocation.selectors().iter().cloned())
        .args(ctx.trailing().iter().cloned()))
}

pub fn repl_command(ctx: &RunContext) -> Result<ExternalCommand> {
    Ok(with_config(runner(ctx, "repl"), service_config(ctx)?)
        .args(ctx.trailing().iter().cloned()))
}

pub fn clean_command(ctx: &RunContext) -> ExternalCommand {
    runner(ctx, "clean").args(ctx.trailing().iter().cloned())
}

pub fn ext_command(ctx: &RunContext) -> ExternalCommand {
    ExternalCommand::new("make")
        .args(["-C".to_string(), ctx.project_path(Path::new("ext")).display().to_string()])
        .arg("install")
        .arg(format!("PG_CONFIG={}", ctx.pg_bin("pg_config").display()))
        .args(ctx.trailing().iter().cloned())
}

/// Open variant: connection flags straight on the command line.
pub fn open_benchmark_command(ctx: &RunContext) -> ExternalCommand {
    runner(ctx, "benchmark")
        .args(["--db-host".to_string(), ctx.sandbox.path.display().to_string()])
        .args(["--db-port".to_string(), ctx.effective_port().to_string()])
        .args(["--db-user", DB_USER])
        .args(["--db-name", PRIMARY_DATABASE])
        .args(ctx.trailing().iter().cloned())
}

/// Render `benchmark.toml` for an enterprise sandbox serving on `http_port`.
pub fn render_benchmark_config(ctx: &RunContext, http_port: u16) -> Result<String> {
    let config = BenchmarkConfig {
        sandbox: ctx.sandbox.path.display().to_string(),
        log_file: ctx.sandbox.log_file().display().to_string(),
        service_config: ctx.sandbox.pe_config().display().to_string(),
        endpoint: format!("http://127.0.0.1:{http_port}"),
    };
    Ok(toml::to_string(&config)?)
}

/// Enterprise variant: write `benchmark.toml` next to the sandbox and
/// point the runner at it.
pub fn enterprise_benchmark_command(ctx: &RunContext) -> Result<ExternalCommand> {
    let http_port = read_port_file(&ctx.sandbox.http_port_file())?;
    let path = ctx.sandbox.benchmark_config();
    let rendered = render_benchmark_config(ctx, http_port)?;
    std::fs::write(&path, rendered)
        .map_err(|e| PgsbError::io(format!("failed to write {}", path.display()), e))?;
    ctx.output.debug(format!("wrote {}", path.display()));
    Ok(with_config(runner(ctx, "benchmark"), path).args(ctx.trailing().iter().cloned()))
}

pub fn run(ctx: &RunContext) -> Result<()> {
    ctx.launcher.run(&run_command(ctx)?)
}

pub fn test(ctx: &RunContext) -> Result<()> {
    ctx.launcher.run(&test_command(ctx)?)
}

pub fn integration_test(ctx: &RunContext) -> Result<()> {
    ctx.launcher.run(&integration_test_command(ctx)?)
}

pub fn repl(ctx: &RunContext) -> Result<()> {
    ctx.launcher.run(&repl_command(ctx)?)
}

pub fn clean(ctx: &RunContext) -> Result<()> {
    ctx.launcher.run(&clean_command(ctx))
}

pub fn ext(ctx: &RunContext) -> Result<()> {
    ctx.launcher.run(&ext_command(ctx))
}

pub fn benchmark(ctx: &RunContext) -> Result<()> {
    let cmd = match ctx.variant.require_known()? {
        ProjectVariant::Enterprise => enterprise_benchmark_command(ctx)?,
        _ => open_benchmark_command(ctx),
    };
    ctx.launcher.run(&cmd)
}
