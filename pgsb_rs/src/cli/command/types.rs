//! Subcommand enum definition for the CLI interface.

use crate::detect::Requirement;

/// The closed set of subcommands. Each variant has exactly one handler in
/// [`crate::cli::dispatch`]; adding a variant without a handler does not
/// compile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subcommand {
    /// Run the benchmark suite against the sandbox.
    Benchmark,
    /// Clean build artifacts via the runner.
    Clean,
    /// Open a sandbox config file in the editor.
    Edit,
    /// Build and install the companion PostgreSQL extension.
    Ext,
    /// Create (or re-create) a sandbox and start PostgreSQL in it.
    Init,
    /// Create two enterprise sandboxes replicating to each other.
    InitSync,
    /// Run the open variant's integration tests.
    IntegrationTest,
    /// Drop and re-create the primary database.
    NewDb,
    /// Create the enterprise auxiliary databases.
    PeDb,
    /// Run a command inside the sandbox environment.
    Pgenv,
    /// Follow the sandbox database log.
    Pglog,
    /// Open psql against the sandbox.
    Psql,
    /// Start a development REPL.
    Repl,
    /// Run the service against the sandbox.
    Run,
    /// Start the sandbox database.
    Start,
    /// Stop the sandbox database.
    Stop,
    /// Run the unit test suite.
    Test,
}

impl Subcommand {
    pub const ALL: [Subcommand; 17] = [
        Subcommand::Benchmark,
        Subcommand::Clean,
        Subcommand::Edit,
        Subcommand::Ext,
        Subcommand::Init,
        Subcommand::InitSync,
        Subcommand::IntegrationTest,
        Subcommand::NewDb,
        Subcommand::PeDb,
        Subcommand::Pgenv,
        Subcommand::Pglog,
        Subcommand::Psql,
        Subcommand::Repl,
        Subcommand::Run,
        Subcommand::Start,
        Subcommand::Stop,
        Subcommand::Test,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == token)
    }

    pub fn name(self) -> &'static str {
        match self {
            Subcommand::Benchmark => "benchmark",
            Subcommand::Clean => "clean",
            Subcommand::Edit => "edit",
            Subcommand::Ext => "ext",
            Subcommand::Init => "init",
            Subcommand::InitSync => "init-sync",
            Subcommand::IntegrationTest => "integration-test",
            Subcommand::NewDb => "new-db",
            Subcommand::PeDb => "pe-db",
            Subcommand::Pgenv => "pgenv",
            Subcommand::Pglog => "pglog",
            Subcommand::Psql => "psql",
            Subcommand::Repl => "repl",
            Subcommand::Run => "run",
            Subcommand::Start => "start",
            Subcommand::Stop => "stop",
            Subcommand::Test => "test",
        }
    }

    /// One-line description for the help listing.
    pub fn description(self) -> &'static str {
        match self {
            Subcommand::Benchmark => "Run the benchmark suite against the sandbox",
            Subcommand::Clean => "Clean build artifacts (runner clean)",
            Subcommand::Edit => "Edit a sandbox config file [-- <file>]",
            Subcommand::Ext => "Build and install the PostgreSQL extension from ext/",
            Subcommand::Init => "Create the sandbox and start PostgreSQL [-- pe|foss]",
            Subcommand::InitSync => "Create sync-a and sync-b replicating to each other",
            Subcommand::IntegrationTest => "Run integration tests (open variant only)",
            Subcommand::NewDb => "Drop and re-create the tessera database",
            Subcommand::PeDb => "Create the enterprise auxiliary databases",
            Subcommand::Pgenv => "Run a command in the sandbox environment [-- <cmd...>]",
            Subcommand::Pglog => "Follow the sandbox database log",
            Subcommand::Psql => "Open psql against the sandbox",
            Subcommand::Repl => "Start a development REPL",
            Subcommand::Run => "Run the service against the sandbox",
            Subcommand::Start => "Start the sandbox database",
            Subcommand::Stop => "Stop the sandbox database",
            Subcommand::Test => "Run unit tests [--only <selector...>]",
        }
    }

    /// Project variant the subcommand needs in the working directory.
    pub fn requirement(self) -> Requirement {
        match self {
            Subcommand::Benchmark
            | Subcommand::Clean
            | Subcommand::Ext
            | Subcommand::Repl
            | Subcommand::Run
            | Subcommand::Test => Requirement::AnyKnown,
            Subcommand::IntegrationTest => Requirement::Open,
            Subcommand::InitSync | Subcommand::PeDb => Requirement::Enterprise,
            Subcommand::Edit
            | Subcommand::Init
            | Subcommand::NewDb
            | Subcommand::Pgenv
            | Subcommand::Pglog
            | Subcommand::Psql
            | Subcommand::Start
            | Subcommand::Stop => Requirement::None,
        }
    }

    /// Whether `--only <selector...>` may follow this subcommand.
    pub fn accepts_test_filter(self) -> bool {
        matches!(self, Subcommand::Test | Subcommand::IntegrationTest)
    }
}
