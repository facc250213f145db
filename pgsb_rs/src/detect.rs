//! Project variant detection from the working directory's descriptor.
//!
//! The descriptor (`project.toml`) names the product flavor:
//! - `name = "tessera"` → open variant (A)
//! - `name = "tessera-enterprise"` → enterprise variant (B)
//!
//! Anything else, including a missing file, is [`ProjectVariant::Unknown`].
//! Unknown is not an error by itself; subcommands that need a specific
//! flavor call one of the `require_*` checks.

use std::fmt;
use std::path::Path;

use crate::error::{PgsbError, Result};

pub const DESCRIPTOR_FILE: &str = "project.toml";
pub const OPEN_MARKER: &str = r#"name = "tessera""#;
pub const ENTERPRISE_MARKER: &str = r#"name = "tessera-enterprise""#;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectVariant {
    /// Variant A: the open-source service.
    Open,
    /// Variant B: the enterprise service.
    Enterprise,
    Unknown,
}

impl fmt::Display for ProjectVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProjectVariant::Open => "open",
            ProjectVariant::Enterprise => "enterprise",
            ProjectVariant::Unknown => "unknown",
        })
    }
}

/// Which variant a subcommand needs before it may run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    None,
    AnyKnown,
    Open,
    Enterprise,
}

/// Classify descriptor contents.
pub fn classify(contents: &str) -> ProjectVariant {
    if contents.contains(OPEN_MARKER) {
        ProjectVariant::Open
    } else if contents.contains(ENTERPRISE_MARKER) {
        ProjectVariant::Enterprise
    } else {
        ProjectVariant::Unknown
    }
}

/// Read `project.toml` in `dir` and classify it.
pub fn detect_variant(dir: &Path) -> ProjectVariant {
    match std::fs::read_to_string(dir.join(DESCRIPTOR_FILE)) {
        Ok(contents) => classify(&contents),
        Err(_) => ProjectVariant::Unknown,
    }
}

impl ProjectVariant {
    pub fn is_known(self) -> bool {
        self != ProjectVariant::Unknown
    }

    pub fn require_known(self) -> Result<Self> {
        if self.is_known() {
            Ok(self)
        } else {
            Err(PgsbError::WorkingDirectory(format!(
                "{DESCRIPTOR_FILE} in the current directory does not describe a Tessera project"
            )))
        }
    }

    pub fn require_open(self) -> Result<Self> {
        self.require_exactly(ProjectVariant::Open)
    }

    pub fn require_enterprise(self) -> Result<Self> {
        self.require_exactly(ProjectVariant::Enterprise)
    }

    fn require_exactly(self, wanted: ProjectVariant) -> Result<Self> {
        if self == wanted {
            Ok(self)
        } else {
            Err(PgsbError::WorkingDirectory(format!(
                "this subcommand needs the {wanted} project, but {DESCRIPTOR_FILE} describes: {self}"
            )))
        }
    }

    /// Apply a subcommand's declared requirement.
    pub fn check(self, requirement: Requirement) -> Result<Self> {
        match requirement {
            Requirement::None => Ok(self),
            Requirement::AnyKnown => self.require_known(),
            Requirement::Open => self.require_open(),
            Requirement::Enterprise => self.require_enterprise(),
        }
    }
}
