//! Dispatcher: resolves the subcommand token, checks the project variant
//! it requires, builds the [`RunContext`] and runs exactly one handler.

mod handlers;

use std::path::{Path, PathBuf};

use super::command::{Invocation, Subcommand};
use super::parser::suggest_similar_subcommand;
use crate::config::PgsbConfig;
use crate::detect::{ProjectVariant, detect_variant};
use crate::error::{PgsbError, Result};
use crate::launch::Launcher;
use crate::output::Output;
use crate::sandbox::{SandboxContext, read_port_file};
use crate::types::DEFAULT_PG_PORT;

/// Everything a handler may look at. Built once per invocation and never
/// mutated; handlers that need a different identity or sandbox derive a
/// new value instead of changing this one.
pub struct RunContext<'a> {
    pub invocation: &'a Invocation,
    pub variant: ProjectVariant,
    pub project_dir: PathBuf,
    pub sandbox: SandboxContext,
    pub config: &'a PgsbConfig,
    pub output: Output,
    pub launcher: Launcher,
}

impl<'a> RunContext<'a> {
    pub fn new(
        invocation: &'a Invocation,
        variant: ProjectVariant,
        project_dir: &Path,
        config: &'a PgsbConfig,
        output: Output,
    ) -> Self {
        let sandbox =
            SandboxContext::resolve(&invocation.global.sandbox_name, &config.sandbox_root());
        let bin_dir = config.pg_bin_dir(invocation.global.pg_version.as_deref());
        let launcher = Launcher::new(
            invocation.global.nice.as_deref(),
            sandbox.env(),
            bin_dir,
            output,
        );
        Self {
            invocation,
            variant,
            project_dir: project_dir.to_path_buf(),
            sandbox,
            config,
            output,
            launcher,
        }
    }

    /// A PostgreSQL executable from the selected bin dir.
    pub fn pg_bin(&self, name: &str) -> PathBuf {
        self.launcher.bin_dir().join(name)
    }

    /// A path relative to the project directory (absolute paths pass through).
    pub fn project_path(&self, rel: &Path) -> PathBuf {
        self.project_dir.join(rel)
    }

    pub fn trailing(&self) -> &[String] {
        &self.invocation.trailing
    }

    /// Port of the running instance: `-p`, else the sandbox's `pg-port`,
    /// else the PostgreSQL default.
    pub fn effective_port(&self) -> u16 {
        if let Some(port) = self.invocation.global.port {
            return port;
        }
        let file = self.sandbox.pg_port_file();
        if file.exists() {
            match read_port_file(&file) {
                Ok(port) => return port,
                Err(e) => self.output.warn(format!("{e}; using {DEFAULT_PG_PORT}")),
            }
        }
        DEFAULT_PG_PORT
    }
}

/// Reject more trailing arguments than a handler takes.
pub(crate) fn expect_at_most(
    helper: &'static str,
    args: &[String],
    max: usize,
    expected: &'static str,
) -> Result<()> {
    if args.len() > max {
        return Err(PgsbError::ArgCount {
            helper,
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

/// Resolve and run the invocation's subcommand.
pub fn dispatch(
    invocation: &Invocation,
    project_dir: &Path,
    config: &PgsbConfig,
    output: Output,
) -> Result<()> {
    let subcommand = Subcommand::from_token(&invocation.subcommand).ok_or_else(|| {
        PgsbError::UnknownSubcommand {
            token: invocation.subcommand.clone(),
            suggestion: suggest_similar_subcommand(&invocation.subcommand),
        }
    })?;

    let variant = detect_variant(project_dir);
    output.debug(format!(
        "subcommand {} (project variant: {variant})",
        subcommand.name()
    ));
    variant.check(subcommand.requirement())?;

    let ctx = RunContext::new(invocation, variant, project_dir, config, output);
    output.debug(format!(
        "sandbox '{}' at {}",
        ctx.sandbox.name,
        ctx.sandbox.path.display()
    ));

    match subcommand {
        Subcommand::Benchmark => handlers::runner::benchmark(&ctx),
        Subcommand::Clean => handlers::runner::clean(&ctx),
        Subcommand::Edit => handlers::control::edit(&ctx),
        Subcommand::Ext => handlers::runner::ext(&ctx),
        Subcommand::Init => handlers::provision::init(&ctx),
        Subcommand::InitSync => handlers::provision::init_sync(&ctx),
        Subcommand::IntegrationTest => handlers::runner::integration_test(&ctx),
        Subcommand::NewDb => handlers::database::new_db(&ctx),
        Subcommand::PeDb => handlers::database::pe_db(&ctx),
        Subcommand::Pgenv => handlers::control::pgenv(&ctx),
        Subcommand::Pglog => handlers::control::pglog(&ctx),
        Subcommand::Psql => handlers::control::psql(&ctx),
        Subcommand::Repl => handlers::runner::repl(&ctx),
        Subcommand::Run => handlers::runner::run(&ctx),
        Subcommand::Start => handlers::control::start(&ctx),
        Subcommand::Stop => handlers::control::stop(&ctx),
        Subcommand::Test => handlers::runner::test(&ctx),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::types::ColorMode;

    /// Owns what a [`RunContext`] borrows, rooted in a temp dir.
    pub struct Fixture {
        pub temp: tempfile::TempDir,
        pub config: PgsbConfig,
        pub invocation: Invocation,
    }

    impl Fixture {
        pub fn new(subcommand: &str) -> Self {
            let temp = tempfile::TempDir::new().expect("temp dir");
            let config = PgsbConfig {
                sandbox_root: Some(temp.path().join("sandboxes")),
                pg_bin_dir: Some(PathBuf::from("/opt/pg/bin")),
                ..PgsbConfig::default()
            };
            Self {
                temp,
                config,
                invocation: Invocation::new(subcommand),
            }
        }

        pub fn project_dir(&self) -> PathBuf {
            self.temp.path().join("project")
        }

        pub fn ctx(&self, variant: ProjectVariant) -> RunContext<'_> {
            RunContext::new(
                &self.invocation,
                variant,
                &self.project_dir(),
                &self.config,
                Output::new(false, ColorMode::Never),
            )
        }
    }
}
