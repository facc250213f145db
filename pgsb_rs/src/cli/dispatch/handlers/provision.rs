//! Sandbox provisioning: init and init-sync.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use super::super::{RunContext, expect_at_most};
use crate::colors::Stream;
use crate::error::{PgsbError, Result};
use crate::launch::ExternalCommand;
use crate::output::Level;
use crate::ports;
use crate::sandbox::{SandboxContext, read_port_file, write_port_file};
use crate::types::{SYNC_INTERVAL_SECS, SYNC_SANDBOXES};

/// Which provisioner builds the sandbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flavor {
    Foss,
    Pe,
}

impl Flavor {
    fn name(self) -> &'static str {
        match self {
            Flavor::Foss => "foss",
            Flavor::Pe => "pe",
        }
    }
}

/// How an `init` run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitOutcome {
    Created { port: u16 },
    Declined,
}

/// Explicit `pe`/`foss` wins; any other argument, or none, picks
/// enterprise when its provisioner exists, else open.
pub fn choose_flavor(explicit: Option<&str>, pe_available: bool) -> Flavor {
    match explicit {
        Some("pe") => Flavor::Pe,
        Some("foss") => Flavor::Foss,
        _ if pe_available => Flavor::Pe,
        _ => Flavor::Foss,
    }
}

fn provisioner_path(ctx: &RunContext, flavor: Flavor) -> PathBuf {
    let rel = match flavor {
        Flavor::Foss => &ctx.config.provisioners.foss,
        Flavor::Pe => &ctx.config.provisioners.pe,
    };
    ctx.project_path(rel)
}

/// Enterprise service ports issued alongside the database port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServicePorts {
    pub http: u16,
    pub https: u16,
}

pub fn provisioner_command(
    ctx: &RunContext,
    flavor: Flavor,
    pg_port: u16,
    service: Option<ServicePorts>,
) -> ExternalCommand {
    let cmd = ExternalCommand::new(provisioner_path(ctx, flavor))
        .arg(ctx.sandbox.path.display().to_string())
        .arg(ctx.launcher.bin_dir().display().to_string())
        .arg(pg_port.to_string());
    match service {
        Some(ports) => cmd.arg(ports.http.to_string()).arg(ports.https.to_string()),
        None => cmd,
    }
}

pub fn postgres_command(ctx: &RunContext, port: u16) -> ExternalCommand {
    let sb = ctx.sandbox.path.display().to_string();
    ExternalCommand::new(ctx.pg_bin("postgres"))
        .args(["-D", sb.as_str(), "-k", sb.as_str()])
        .args(["-p".to_string(), port.to_string()])
}

fn allocate_distinct(taken: &[u16]) -> Result<u16> {
    for _ in 0..8 {
        let port = ports::allocate_ephemeral()
            .map_err(|e| PgsbError::io("failed to allocate a port", e))?;
        if !taken.contains(&port) {
            return Ok(port);
        }
    }
    Err(PgsbError::io(
        "failed to allocate a port",
        std::io::Error::other("kernel kept returning ports already issued"),
    ))
}

fn confirm_recreate(ctx: &RunContext, input: &mut dyn BufRead) -> Result<bool> {
    let prompt = ctx.output.render(
        Level::Info,
        Stream::Stderr,
        &format!(
            "sandbox '{}' already exists at {}; remove and re-create it? [y/N] ",
            ctx.sandbox.name,
            ctx.sandbox.path.display()
        ),
    );
    let mut stderr = std::io::stderr().lock();
    write!(stderr, "{prompt}")
        .and_then(|()| stderr.flush())
        .map_err(|e| PgsbError::io("failed to write confirmation prompt", e))?;
    drop(stderr);

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|e| PgsbError::io("failed to read confirmation", e))?;
    Ok(answer.trim_start().starts_with(['y', 'Y']))
}

fn stop_existing(ctx: &RunContext) {
    let cmd = ExternalCommand::new(ctx.pg_bin("pg_ctl"))
        .args(["-D".to_string(), ctx.sandbox.path.display().to_string()])
        .args(["stop", "-m", "fast"]);
    match ctx.launcher.status(&cmd) {
        Ok(0) => ctx.output.note("stopped the running instance"),
        Ok(code) => ctx
            .output
            .note(format!("no running instance stopped (pg_ctl exit {code})")),
        Err(e) => ctx.output.note(format!("could not stop instance: {e}")),
    }
}

/// Full `init` against `ctx.sandbox`, reading the confirmation answer
/// from `input` when the sandbox already exists.
pub fn init_with(ctx: &RunContext, input: &mut dyn BufRead) -> Result<InitOutcome> {
    expect_at_most("init", ctx.trailing(), 1, "0 or 1")?;
    let explicit = ctx.trailing().first().map(String::as_str);
    let flavor = choose_flavor(explicit, provisioner_path(ctx, Flavor::Pe).is_file());
    let provisioner = provisioner_path(ctx, flavor);
    if !provisioner.is_file() {
        return Err(PgsbError::WorkingDirectory(format!(
            "{} provisioner not found at {}",
            flavor.name(),
            provisioner.display()
        )));
    }
    ctx.output.debug(format!(
        "provisioning '{}' with {}",
        ctx.sandbox.name,
        provisioner.display()
    ));

    let sb = &ctx.sandbox.path;
    if sb.exists() {
        if !confirm_recreate(ctx, input)? {
            ctx.output.note("keeping the existing sandbox");
            return Ok(InitOutcome::Declined);
        }
        stop_existing(ctx);
        fs::remove_dir_all(sb)
            .map_err(|e| PgsbError::io(format!("failed to remove {}", sb.display()), e))?;
    }

    let pg_port = ports::choose(ctx.invocation.global.port)
        .map_err(|e| PgsbError::io("failed to allocate a port", e))?;
    let service = match flavor {
        Flavor::Pe => {
            let http = allocate_distinct(&[pg_port])?;
            let https = allocate_distinct(&[pg_port, http])?;
            Some(ServicePorts { http, https })
        }
        Flavor::Foss => None,
    };

    fs::create_dir_all(&ctx.sandbox.root).map_err(|e| {
        PgsbError::io(format!("failed to create {}", ctx.sandbox.root.display()), e)
    })?;
    ctx.launcher
        .run(&provisioner_command(ctx, flavor, pg_port, service))?;

    fs::create_dir_all(sb)
        .map_err(|e| PgsbError::io(format!("failed to create {}", sb.display()), e))?;
    write_port_file(&ctx.sandbox.pg_port_file(), pg_port)?;
    if let Some(ports) = service {
        for (file, port) in [
            (ctx.sandbox.http_port_file(), ports.http),
            (ctx.sandbox.https_port_file(), ports.https),
        ] {
            if !file.exists() {
                write_port_file(&file, port)?;
            }
        }
    }

    let log = ctx.sandbox.log_file();
    let pid = ctx
        .launcher
        .spawn_detached(&postgres_command(ctx, pg_port), &log)?;
    ctx.output.success(format!(
        "sandbox '{}' ready at {} ({} flavor, port {pg_port}, pid {pid}, log {})",
        ctx.sandbox.name,
        sb.display(),
        flavor.name(),
        log.display()
    ));
    Ok(InitOutcome::Created { port: pg_port })
}

pub fn init(ctx: &RunContext) -> Result<()> {
    let mut stdin = std::io::stdin().lock();
    init_with(ctx, &mut stdin).map(|_| ())
}

/// Service ports the provisioner issued, as recorded in the sandbox.
pub fn read_service_ports(sandbox: &SandboxContext) -> Result<ServicePorts> {
    Ok(ServicePorts {
        http: read_port_file(&sandbox.http_port_file())?,
        https: read_port_file(&sandbox.https_port_file())?,
    })
}

/// TOML appended to a sync sandbox's `pe.toml`.
pub fn replication_block(peer: &str, peer_http_port: u16) -> String {
    format!(
        "\n[[replication.peers]]\n\
         name = \"{peer}\"\n\
         url = \"http://127.0.0.1:{peer_http_port}\"\n\
         tls = false\n\
         interval_secs = {SYNC_INTERVAL_SECS}\n"
    )
}

pub fn init_sync_with(ctx: &RunContext, input: &mut dyn BufRead) -> Result<()> {
    let mut sandboxes = Vec::with_capacity(SYNC_SANDBOXES.len());
    for name in SYNC_SANDBOXES {
        let mut invocation = ctx.invocation.clone();
        invocation.global.sandbox_name = name.to_string();
        invocation.global.port = None;
        invocation.trailing = vec![Flavor::Pe.name().to_string()];
        let sub = RunContext::new(
            &invocation,
            ctx.variant,
            &ctx.project_dir,
            ctx.config,
            ctx.output,
        );
        if init_with(&sub, input)? == InitOutcome::Declined {
            ctx.output.note("init-sync aborted");
            return Ok(());
        }
        sandboxes.push(sub.sandbox.clone());
    }

    let mut http_ports = Vec::with_capacity(sandboxes.len());
    for sandbox in &sandboxes {
        let config = sandbox.pe_config();
        if !config.is_file() {
            return Err(PgsbError::MissingSandboxConfig(config));
        }
        let ports = read_service_ports(sandbox)?;
        ctx.output.debug(format!(
            "{} serves http {} and https {}",
            sandbox.name, ports.http, ports.https
        ));
        http_ports.push(ports.http);
    }

    for (idx, sandbox) in sandboxes.iter().enumerate() {
        let peer = (idx + 1) % sandboxes.len();
        let block = replication_block(&sandboxes[peer].name, http_ports[peer]);
        let path = sandbox.pe_config();
        OpenOptions::new()
            .append(true)
            .open(&path)
            .and_then(|mut f| f.write_all(block.as_bytes()))
            .map_err(|e| PgsbError::io(format!("failed to update {}", path.display()), e))?;
        ctx.output.debug(format!(
            "{} replicates to {} on port {}",
            sandbox.name, sandboxes[peer].name, http_ports[peer]
        ));
    }

    ctx.output.success(format!(
        "sync sandboxes {} ready",
        SYNC_SANDBOXES.join(" and ")
    ));
    Ok(())
}

pub fn init_sync(ctx: &RunContext) -> Result<()> {
    let mut stdin = std::io::stdin().lock();
    init_sync_with(ctx, &mut stdin)
}
