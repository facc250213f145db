//! Sandbox identity resolution.
//!
//! A sandbox is `<root>/<name>`: one PostgreSQL data directory plus the
//! files pgsb and the provisioners keep next to it. Resolution is pure;
//! creating and deleting the directory is left to the executors.
//!
//! ```text
//! <root>/<name>/
//! ├── postgresql.conf      # written by either provisioner
//! ├── pe.toml              # enterprise service config (pe provisioner)
//! ├── pg.log               # database log (init, start)
//! ├── pg-port              # PostgreSQL port issued by init
//! ├── pe-port              # enterprise HTTP port
//! ├── pe-port-ssl          # enterprise HTTPS port
//! └── benchmark.toml       # generated by enterprise benchmark runs
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PgsbError, Result};
use crate::types::{DB_USER, ENV_DB_USER, ENV_SANDBOX_PATH};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SandboxContext {
    pub name: String,
    pub root: PathBuf,
    pub path: PathBuf,
}

impl SandboxContext {
    pub fn resolve(name: &str, root: &Path) -> Self {
        Self {
            name: name.to_string(),
            root: root.to_path_buf(),
            path: root.join(name),
        }
    }

    /// Environment exported to every delegated process.
    pub fn env(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (ENV_DB_USER.to_string(), DB_USER.to_string()),
            (ENV_SANDBOX_PATH.to_string(), self.path.display().to_string()),
        ])
    }

    pub fn log_file(&self) -> PathBuf {
        self.path.join("pg.log")
    }

    pub fn pg_port_file(&self) -> PathBuf {
        self.path.join("pg-port")
    }

    pub fn http_port_file(&self) -> PathBuf {
        self.path.join("pe-port")
    }

    pub fn https_port_file(&self) -> PathBuf {
        self.path.join("pe-port-ssl")
    }

    pub fn pe_config(&self) -> PathBuf {
        self.path.join("pe.toml")
    }

    pub fn pg_config(&self) -> PathBuf {
        self.path.join("postgresql.conf")
    }

    pub fn benchmark_config(&self) -> PathBuf {
        self.path.join("benchmark.toml")
    }
}

/// Validate a user-supplied sandbox name so `root/name` stays inside root.
pub fn validate_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("sandbox name must not be empty".to_string());
    }
    if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(format!(
            "invalid sandbox name '{name}': must be a single directory name"
        ));
    }
    Ok(())
}

/// Read a port number written as decimal text (trailing newline allowed).
pub fn read_port_file(path: &Path) -> Result<u16> {
    let raw = fs::read_to_string(path)
        .map_err(|e| PgsbError::io(format!("failed to read {}", path.display()), e))?;
    raw.trim().parse::<u16>().map_err(|_| {
        PgsbError::io(
            format!("failed to read {}", path.display()),
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("'{}' is not a port number", raw.trim()),
            ),
        )
    })
}

pub fn write_port_file(path: &Path, port: u16) -> Result<()> {
    fs::write(path, format!("{port}\n"))
        .map_err(|e| PgsbError::io(format!("failed to write {}", path.display()), e))
}
