use crate::core::ConfigProvider;
use crate::utils::error::{MigrateError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub project: ProjectConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub migration: MigrationConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub root: String,
    pub plan: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub report: Option<String>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    #[serde(default)]
    pub insert_todos_for_skipped_fields: bool,
    #[serde(default = "default_legacy_symbol")]
    pub legacy_symbol: String,
    #[serde(default = "default_signal_symbol")]
    pub signal_symbol: String,
    #[serde(default = "default_core_module")]
    pub core_module: String,
}

fn default_legacy_symbol() -> String {
    "Input".to_string()
}

fn default_signal_symbol() -> String {
    "input".to_string()
}

fn default_core_module() -> String {
    "@angular/core".to_string()
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            insert_todos_for_skipped_fields: false,
            legacy_symbol: default_legacy_symbol(),
            signal_symbol: default_signal_symbol(),
            core_module: default_core_module(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

const DEFAULT_REPORT: &str = "migration-report.json";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MigrateError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| MigrateError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PROJECT_ROOT})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("project.root", &self.project.root)?;
        validation::validate_path("project.plan", &self.project.plan)?;
        validation::validate_path("output.path", &self.output.path)?;
        if let Some(report) = &self.output.report {
            validation::validate_path("output.report", report)?;
        }

        let migration = &self.migration;
        validation::validate_identifier("migration.legacy_symbol", &migration.legacy_symbol)?;
        validation::validate_identifier("migration.signal_symbol", &migration.signal_symbol)?;
        validation::validate_module_specifier("migration.core_module", &migration.core_module)?;

        if let Some(level) = self.log_level() {
            if !LOG_LEVELS.contains(&level.trim().to_lowercase().as_str()) {
                return Err(MigrateError::InvalidConfigValueError {
                    field: "monitoring.log_level".to_string(),
                    value: level.to_string(),
                    reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
                });
            }
        }

        if migration.legacy_symbol == migration.signal_symbol {
            return Err(MigrateError::InvalidConfigValueError {
                field: "migration.signal_symbol".to_string(),
                value: migration.signal_symbol.clone(),
                reason: "must differ from migration.legacy_symbol".to_string(),
            });
        }

        Ok(())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn project_root(&self) -> &str {
        &self.project.root
    }

    fn plan_path(&self) -> &str {
        &self.project.plan
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn report_filename(&self) -> &str {
        self.output.report.as_deref().unwrap_or(DEFAULT_REPORT)
    }

    fn insert_todos_for_skipped_fields(&self) -> bool {
        self.migration.insert_todos_for_skipped_fields
    }

    fn legacy_symbol(&self) -> &str {
        &self.migration.legacy_symbol
    }

    fn signal_symbol(&self) -> &str {
        &self.migration.signal_symbol
    }

    fn core_module(&self) -> &str {
        &self.migration.core_module
    }

    fn dry_run(&self) -> bool {
        self.output.dry_run.unwrap_or(false)
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[project]
root = "./app"
plan = "migration-plan.json"

[output]
path = "./migrated"

[migration]
insert_todos_for_skipped_fields = true
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.project_root(), "./app");
        assert!(config.insert_todos_for_skipped_fields());
        assert_eq!(config.legacy_symbol(), "Input");
        assert_eq!(config.signal_symbol(), "input");
        assert_eq!(config.core_module(), "@angular/core");
        assert_eq!(config.report_filename(), "migration-report.json");
        assert!(!config.dry_run());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_migration_section_is_optional() {
        let config = TomlConfig::from_toml_str(
            r#"
[project]
root = "."
plan = "plan.json"

[output]
path = "out"
report = "report.json"
dry_run = true

[monitoring]
enabled = true
json_logs = true
log_level = "debug"
"#,
        )
        .unwrap();
        assert_eq!(config.log_level(), Some("debug"));
        assert!(config.validate().is_ok());
        assert!(!config.insert_todos_for_skipped_fields());
        assert_eq!(config.report_filename(), "report.json");
        assert!(config.dry_run());
        assert!(config.monitoring_enabled());
        assert!(config.json_logs());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SIGNAL_MIGRATE_TEST_ROOT", "/work/app");

        let config = TomlConfig::from_toml_str(
            r#"
[project]
root = "${SIGNAL_MIGRATE_TEST_ROOT}"
plan = "${SIGNAL_MIGRATE_UNSET_VAR}/plan.json"

[output]
path = "out"
"#,
        )
        .unwrap();
        assert_eq!(config.project.root, "/work/app");
        assert_eq!(config.project.plan, "${SIGNAL_MIGRATE_UNSET_VAR}/plan.json");

        std::env::remove_var("SIGNAL_MIGRATE_TEST_ROOT");
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[project]
root = "."
plan = "plan.json"

[output]
path = "out"

[migration]
legacy_symbol = "input"
signal_symbol = "input"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let config = TomlConfig::from_toml_str(
            r#"
[project]
root = "."
plan = "plan.json"

[output]
path = "out"

[monitoring]
enabled = false
log_level = "loud"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(MigrateError::InvalidConfigValueError { ref field, .. }) if field == "monitoring.log_level"
        ));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[project\nroot=").unwrap_err();
        assert!(matches!(err, MigrateError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.plan_path(), "migration-plan.json");
    }
}
