//! Configuration file support for pgsb.
//!
//! Loads optional `.pgsb/config.toml` from the project directory, then
//! applies `PGSB_*` environment overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::types::{ColorMode, DEFAULT_PG_VERSION};

pub const ENV_SANDBOX_ROOT: &str = "PGSB_SANDBOX_ROOT";
pub const ENV_PG_BIN: &str = "PGSB_PG_BIN";
pub const ENV_PG_BIN_TEMPLATE: &str = "PGSB_PG_BIN_TEMPLATE";
pub const ENV_RUNNER: &str = "PGSB_RUNNER";
pub const ENV_EDITOR: &str = "PGSB_EDITOR";

const VERSION_PLACEHOLDER: &str = "{version}";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PgsbConfig {
    /// Directory holding all sandboxes (default `~/.pgsb/sandboxes`)
    pub sandbox_root: Option<PathBuf>,
    /// Explicit PostgreSQL bin dir; `--pgver` takes precedence
    pub pg_bin_dir: Option<PathBuf>,
    /// Bin dir pattern with a `{version}` placeholder
    pub pg_bin_template: String,
    pub default_pg_version: String,
    /// Build/test runner, relative to the project directory
    pub runner: PathBuf,
    /// Service config used by the open variant for `run`/`test`/`repl`
    pub open_service_config: PathBuf,
    pub color: ColorMode,
    pub editor: Option<String>,
    pub provisioners: ProvisionerConfig,
    /// `$EDITOR`, used when no editor is configured
    #[serde(skip)]
    pub fallback_editor: Option<String>,
}

/// Provisioning executables, relative to the project directory
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    pub foss: PathBuf,
    pub pe: PathBuf,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            foss: PathBuf::from("scripts/provision-foss"),
            pe: PathBuf::from("scripts/provision-pe"),
        }
    }
}

impl Default for PgsbConfig {
    fn default() -> Self {
        Self {
            sandbox_root: None,
            pg_bin_dir: None,
            pg_bin_template: format!("/usr/lib/postgresql/{VERSION_PLACEHOLDER}/bin"),
            default_pg_version: DEFAULT_PG_VERSION.to_string(),
            runner: PathBuf::from("bin/runner"),
            open_service_config: PathBuf::from("config/dev.toml"),
            color: ColorMode::Auto,
            editor: None,
            provisioners: ProvisionerConfig::default(),
            fallback_editor: None,
        }
    }
}

impl PgsbConfig {
    /// Config file location for a project directory.
    pub fn path_for(project_dir: &Path) -> PathBuf {
        project_dir.join(".pgsb").join("config.toml")
    }

    /// Load config from `.pgsb/config.toml` in `project_dir`.
    /// A missing file yields the defaults.
    pub fn load(project_dir: &Path) -> anyhow::Result<Self> {
        Self::load_from_path(&Self::path_for(project_dir))
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Apply `PGSB_*` overrides from an environment snapshot.
    pub fn with_env_overrides(mut self, vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| vars.get(key).filter(|v| !v.is_empty());
        if let Some(root) = get(ENV_SANDBOX_ROOT) {
            self.sandbox_root = Some(PathBuf::from(root));
        }
        if let Some(bin) = get(ENV_PG_BIN) {
            self.pg_bin_dir = Some(PathBuf::from(bin));
        }
        if let Some(template) = get(ENV_PG_BIN_TEMPLATE) {
            self.pg_bin_template = template.clone();
        }
        if let Some(runner) = get(ENV_RUNNER) {
            self.runner = PathBuf::from(runner);
        }
        if let Some(editor) = get(ENV_EDITOR) {
            self.editor = Some(editor.clone());
        }
        self.fallback_editor = get("EDITOR").cloned();
        self
    }

    /// Sandbox root: configured value, else `~/.pgsb/sandboxes`.
    pub fn sandbox_root(&self) -> PathBuf {
        match &self.sandbox_root {
            Some(root) => root.clone(),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".pgsb")
                .join("sandboxes"),
        }
    }

    /// PostgreSQL binary directory, honoring a `--pgver` override.
    pub fn pg_bin_dir(&self, version_override: Option<&str>) -> PathBuf {
        match (version_override, &self.pg_bin_dir) {
            (Some(version), _) => self.templated_bin_dir(version),
            (None, Some(dir)) => dir.clone(),
            (None, None) => self.templated_bin_dir(&self.default_pg_version),
        }
    }

    fn templated_bin_dir(&self, version: &str) -> PathBuf {
        PathBuf::from(self.pg_bin_template.replace(VERSION_PLACEHOLDER, version))
    }

    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| self.fallback_editor.clone())
            .unwrap_or_else(|| "vi".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = PgsbConfig::default();
        assert_eq!(config.runner, PathBuf::from("bin/runner"));
        assert_eq!(
            config.pg_bin_dir(None),
            PathBuf::from("/usr/lib/postgresql/16/bin")
        );
        assert_eq!(config.color, ColorMode::Auto);
        assert_eq!(config.editor(), "vi");
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().expect("temp dir");
        let config = PgsbConfig::load(temp.path()).expect("defaults");
        assert!(config.sandbox_root.is_none());
    }

    #[test]
    fn test_load_valid_config() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join(".pgsb");
        std::fs::create_dir_all(&dir).expect("create .pgsb");
        let mut file = std::fs::File::create(dir.join("config.toml")).expect("create config");
        writeln!(
            file,
            r#"
sandbox_root = "/srv/sandboxes"
default_pg_version = "15"
color = "never"

[provisioners]
pe = "tools/pe-sandbox"
"#
        )
        .expect("write config");

        let config = PgsbConfig::load(temp.path()).expect("valid config");
        assert_eq!(config.sandbox_root(), PathBuf::from("/srv/sandboxes"));
        assert_eq!(
            config.pg_bin_dir(None),
            PathBuf::from("/usr/lib/postgresql/15/bin")
        );
        assert_eq!(config.color, ColorMode::Never);
        assert_eq!(config.provisioners.pe, PathBuf::from("tools/pe-sandbox"));
        assert_eq!(
            config.provisioners.foss,
            PathBuf::from("scripts/provision-foss")
        );
    }

    #[test]
    fn test_load_invalid_config_reports_path() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join(".pgsb");
        std::fs::create_dir_all(&dir).expect("create .pgsb");
        std::fs::write(dir.join("config.toml"), "color = [").expect("write");

        let err = PgsbConfig::load(temp.path()).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }

    #[test]
    fn test_pgver_overrides_explicit_bin_dir() {
        let config = PgsbConfig::default().with_env_overrides(&vars(&[
            (ENV_PG_BIN, "/opt/pg/bin"),
            (ENV_PG_BIN_TEMPLATE, "/opt/pg-{version}/bin"),
        ]));
        assert_eq!(config.pg_bin_dir(None), PathBuf::from("/opt/pg/bin"));
        assert_eq!(
            config.pg_bin_dir(Some("14")),
            PathBuf::from("/opt/pg-14/bin")
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = PgsbConfig::default().with_env_overrides(&vars(&[
            (ENV_SANDBOX_ROOT, "/tmp/boxes"),
            (ENV_RUNNER, "/usr/local/bin/runner"),
            ("EDITOR", "nano"),
            (ENV_PG_BIN, ""),
        ]));
        assert_eq!(config.sandbox_root(), PathBuf::from("/tmp/boxes"));
        assert_eq!(config.runner, PathBuf::from("/usr/local/bin/runner"));
        assert_eq!(config.editor(), "nano");
        assert!(config.pg_bin_dir.is_none());
    }

    #[test]
    fn test_configured_editor_beats_editor_env() {
        let config = PgsbConfig {
            editor: Some("code --wait".to_string()),
            ..PgsbConfig::default()
        }
        .with_env_overrides(&vars(&[("EDITOR", "nano")]));
        assert_eq!(config.editor(), "code --wait");
    }

    #[test]
    fn test_pgsb_editor_beats_editor() {
        let config = PgsbConfig::default()
            .with_env_overrides(&vars(&[(ENV_EDITOR, "hx"), ("EDITOR", "nano")]));
        assert_eq!(config.editor(), "hx");
    }
}
