pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::cli::LocalStorage;

pub use crate::core::engine::{migrate_program, MigrationEngine, MigrationReport};
pub use crate::core::migrate::{MigrationOptions, MigrationPass};
pub use crate::core::replacement::{Replacement, ReplacementSet, TextUpdate};
pub use crate::utils::error::{MigrateError, Result};
