//! Subcommand handlers split by domain
//!
//! - `control`: direct PostgreSQL control and sandbox inspection
//! - `database`: best-effort SQL step sequences (new-db, pe-db)
//! - `provision`: sandbox creation (init, init-sync)
//! - `runner`: delegation to the project's build/test runner

pub mod control;
pub mod database;
pub mod provision;
pub mod runner;
