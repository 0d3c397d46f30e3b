pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::{MigrateError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "signal-input-migrate")]
#[command(about = "Migrate legacy @Input() declarations to signal inputs")]
pub struct CliConfig {
    #[arg(long, default_value = ".")]
    pub project_root: String,

    /// Migration plan (classified inputs), relative to the project root
    #[arg(long, default_value = "migration-plan.json")]
    pub plan: String,

    #[arg(long, default_value = "./migrated")]
    pub output_path: String,

    #[arg(long, default_value = "migration-report.json")]
    pub report: String,

    #[arg(long, help = "Leave a TODO comment above every input that was skipped")]
    pub insert_todos: bool,

    #[arg(long, default_value = "Input")]
    pub legacy_symbol: String,

    #[arg(long, default_value = "input")]
    pub signal_symbol: String,

    #[arg(long, default_value = "@angular/core")]
    pub core_module: String,

    #[arg(long, help = "Compute edits without writing any file")]
    pub dry_run: bool,

    #[arg(long, help = "Log time and memory per phase")]
    pub monitor: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn project_root(&self) -> &str {
        &self.project_root
    }

    fn plan_path(&self) -> &str {
        &self.plan
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn report_filename(&self) -> &str {
        &self.report
    }

    fn insert_todos_for_skipped_fields(&self) -> bool {
        self.insert_todos
    }

    fn legacy_symbol(&self) -> &str {
        &self.legacy_symbol
    }

    fn signal_symbol(&self) -> &str {
        &self.signal_symbol
    }

    fn core_module(&self) -> &str {
        &self.core_module
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitor
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("project_root", &self.project_root)?;
        validation::validate_path("plan", &self.plan)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_path("report", &self.report)?;
        validation::validate_identifier("legacy_symbol", &self.legacy_symbol)?;
        validation::validate_identifier("signal_symbol", &self.signal_symbol)?;
        validation::validate_module_specifier("core_module", &self.core_module)?;

        if self.legacy_symbol == self.signal_symbol {
            return Err(MigrateError::InvalidConfigValueError {
                field: "signal_symbol".to_string(),
                value: self.signal_symbol.clone(),
                reason: "must differ from legacy_symbol".to_string(),
            });
        }
        Ok(())
    }
}
