//! Process launching for delegated tools.
//!
//! Executors describe what to run as an [`ExternalCommand`]; the
//! [`Launcher`] owns everything shared by all launches of one invocation:
//! the exported sandbox environment, the PostgreSQL bin dir prefixed to
//! `PATH`, and the optional priority wrapper from `pgsb nice <cmd>`.
//! Nothing here mutates this process's own environment.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::error::{PgsbError, Result};
use crate::output::Output;

/// One delegated process: program, arguments and extra environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Short name for diagnostics (`pg_ctl`, not the full path).
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

/// Shell-ish rendering of a command line, for echo and error messages.
pub fn render_command_line(parts: &[String]) -> String {
    parts
        .iter()
        .map(|p| {
            if p.is_empty() || p.contains(char::is_whitespace) || p.contains('"') {
                format!("'{}'", p.replace('\'', r"'\''"))
            } else {
                p.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct Launcher {
    wrapper: Vec<String>,
    base_env: BTreeMap<String, String>,
    bin_dir: PathBuf,
    output: Output,
}

impl Launcher {
    pub fn new(
        wrapper: Option<&str>,
        base_env: BTreeMap<String, String>,
        bin_dir: PathBuf,
        output: Output,
    ) -> Self {
        Self {
            wrapper: wrapper
                .map(|w| w.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            base_env,
            bin_dir,
            output,
        }
    }

    pub fn base_env(&self) -> &BTreeMap<String, String> {
        &self.base_env
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Full argv after applying the priority wrapper.
    pub fn argv(&self, external: &ExternalCommand) -> Vec<String> {
        self.wrapper
            .iter()
            .cloned()
            .chain(std::iter::once(external.program.display().to_string()))
            .chain(external.args.iter().cloned())
            .collect()
    }

    /// Environment the child sees on top of the inherited one.
    pub fn child_env(&self, external: &ExternalCommand) -> BTreeMap<String, OsString> {
        let mut env: BTreeMap<String, OsString> = self
            .base_env
            .iter()
            .chain(external.env.iter())
            .map(|(k, v)| (k.clone(), OsString::from(v)))
            .collect();
        env.insert("PATH".to_string(), self.search_path());
        env
    }

    fn search_path(&self) -> OsString {
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let dirs = std::iter::once(self.bin_dir.clone()).chain(std::env::split_paths(&inherited));
        std::env::join_paths(dirs).unwrap_or(inherited)
    }

    fn build(&self, external: &ExternalCommand) -> (Command, String) {
        let argv = self.argv(external);
        let line = render_command_line(&argv);
        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..]).envs(self.child_env(external));
        (cmd, line)
    }

    /// Run to completion and return the exit code. Only a failure to
    /// launch is an error; a non-zero exit is returned as a value.
    pub fn status(&self, external: &ExternalCommand) -> Result<i32> {
        let (mut cmd, line) = self.build(external);
        self.output.echo_command(&line);
        tracing::debug!(command = %line, "running");
        let status = cmd
            .status()
            .map_err(|e| PgsbError::io(format!("failed to launch {}", external.program.display()), e))?;
        let code = exit_code(status);
        tracing::debug!(command = %line, code, "finished");
        Ok(code)
    }

    /// Run to completion; a non-zero exit becomes [`PgsbError::ToolFailed`].
    pub fn run(&self, external: &ExternalCommand) -> Result<()> {
        match self.status(external)? {
            0 => Ok(()),
            code => Err(PgsbError::ToolFailed {
                program: external.program_name(),
                code,
            }),
        }
    }

    /// Start in the background with stdout/stderr appended to `log`.
    /// Returns the child's pid without waiting for it.
    pub fn spawn_detached(&self, external: &ExternalCommand, log: &Path) -> Result<u32> {
        let (mut cmd, line) = self.build(external);
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log)
            .map_err(|e| PgsbError::io(format!("failed to open {}", log.display()), e))?;
        let log_err = log_file
            .try_clone()
            .map_err(|e| PgsbError::io(format!("failed to open {}", log.display()), e))?;
        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(log_file))
            .stderr(Stdio::from(log_err));
        detach(&mut cmd);

        self.output.echo_command(&format!("{line} >> {} 2>&1 &", log.display()));
        let child = cmd
            .spawn()
            .map_err(|e| PgsbError::io(format!("failed to launch {}", external.program.display()), e))?;
        tracing::debug!(command = %line, pid = child.id(), "spawned in background");
        Ok(child.id())
    }
}

#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    // Own process group: Ctrl-C in the terminal must not reach the database.
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn detach(_cmd: &mut Command) {}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColorMode;

    fn launcher(wrapper: Option<&str>) -> Launcher {
        Launcher::new(
            wrapper,
            BTreeMap::from([("PGUSER".to_string(), "tessera".to_string())]),
            PathBuf::from("/opt/pg/bin"),
            Output::new(false, ColorMode::Never),
        )
    }

    #[test]
    fn test_argv_without_wrapper() {
        let external = ExternalCommand::new("/opt/pg/bin/pg_ctl").args(["-D", "/sb", "stop"]);
        assert_eq!(
            launcher(None).argv(&external),
            vec!["/opt/pg/bin/pg_ctl", "-D", "/sb", "stop"]
        );
        assert_eq!(external.program_name(), "pg_ctl");
    }

    #[test]
    fn test_argv_with_nice_wrapper() {
        let external = ExternalCommand::new("bin/runner").arg("test");
        assert_eq!(
            launcher(Some("nice -n 19")).argv(&external),
            vec!["nice", "-n", "19", "bin/runner", "test"]
        );
    }

    #[test]
    fn test_command_env_overrides_base_env() {
        let external = ExternalCommand::new("psql").env("PGUSER", "postgres");
        let env = launcher(None).child_env(&external);
        assert_eq!(env.get("PGUSER"), Some(&OsString::from("postgres")));
        let path = env.get("PATH").expect("PATH is always set");
        let first = std::env::split_paths(path).next();
        assert_eq!(first, Some(PathBuf::from("/opt/pg/bin")));
    }

    #[test]
    fn test_base_env_is_untouched_by_overrides() {
        let l = launcher(None);
        let _ = l.child_env(&ExternalCommand::new("psql").env("PGUSER", "postgres"));
        assert_eq!(
            l.base_env().get("PGUSER").map(String::as_str),
            Some("tessera")
        );
    }

    #[test]
    fn test_render_command_line_quotes() {
        let parts = vec![
            "pg_ctl".to_string(),
            "-o".to_string(),
            "-k /sb -p 5432".to_string(),
        ];
        assert_eq!(render_command_line(&parts), "pg_ctl -o '-k /sb -p 5432'");
    }

    #[cfg(unix)]
    #[test]
    fn test_status_reports_exit_code() {
        let l = launcher(None);
        let external = ExternalCommand::new("sh").args(["-c", "exit 4"]);
        assert_eq!(l.status(&external).expect("sh runs"), 4);
        let err = l.run(&external).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.to_string(), "sh exited with status 4");
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let l = launcher(None);
        let err = l
            .status(&ExternalCommand::new("/definitely/not/here/pgsb-tool"))
            .unwrap_err();
        assert!(err.to_string().starts_with("failed to launch"));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_detached_writes_log() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let log = temp.path().join("pg.log");
        let external = ExternalCommand::new("sh").args(["-c", "echo started"]);
        let pid = launcher(None).spawn_detached(&external, &log).expect("spawn");
        assert!(pid > 0);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            let contents = std::fs::read_to_string(&log).unwrap_or_default();
            if contents.contains("started") {
                break;
            }
            assert!(std::time::Instant::now() < deadline, "log never written");
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
    }
}
