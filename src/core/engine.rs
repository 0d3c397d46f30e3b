use crate::adapters::{
    MigrationPlan, SignalInputSynthesizer, SourceImportManager, TodoCommentAnnotator,
};
use crate::core::apply::apply_text_updates;
use crate::core::migrate::{MigrationOptions, MigrationPass, MigrationStats};
use crate::core::replacement::ReplacementSet;
use crate::core::{ConfigProvider, Storage};
use crate::domain::model::{ImportSpecifier, Program, ProjectFile};
use crate::utils::error::{MigrateError, Result};
use crate::utils::monitor::PhaseMonitor;
use crate::utils::validation::Validate;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary written next to the migrated sources.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub generated_at: DateTime<Utc>,
    pub dry_run: bool,
    pub stats: MigrationStats,
    pub edits: usize,
    pub files_changed: Vec<ProjectFile>,
    pub imports_removed: Vec<ProjectFile>,
    pub partially_migrated: Vec<ProjectFile>,
}

/// In-memory result of migrating one program.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    pub replacements: ReplacementSet,
    pub stats: MigrationStats,
    pub imports_removed: Vec<ProjectFile>,
    pub partially_migrated: Vec<ProjectFile>,
    /// New text for every file that has at least one edit.
    pub outputs: BTreeMap<ProjectFile, String>,
}

/// Synchronous core of the engine: run the pass, materialize imports, apply edits.
pub fn migrate_program(
    plan: &MigrationPlan,
    program: &Program,
    options: &MigrationOptions,
    signal_import: ImportSpecifier,
) -> Result<MigrationResult> {
    let synthesizer = SignalInputSynthesizer::new(signal_import);
    let annotator = TodoCommentAnnotator;
    let pass = MigrationPass::new(&synthesizer, &annotator, options);

    let mut replacements = ReplacementSet::new();
    let mut imports = SourceImportManager::new();
    let outcome = pass.run(plan, program, &mut replacements, &mut imports)?;

    // 匯入變更必須在所有宣告處理完後才轉成編輯
    replacements.extend(imports.finalize(program)?);
    replacements.check_disjoint()?;

    let mut outputs = BTreeMap::new();
    for (file, updates) in replacements.iter() {
        let source = program.file(file).ok_or_else(|| MigrateError::UnknownFile {
            file: file.to_string(),
        })?;
        let text = apply_text_updates(file, &source.text, updates)?;
        outputs.insert(file.clone(), text);
    }

    let partially_migrated = outcome
        .status
        .migrated_files()
        .filter(|file| outcome.status.has_unmigrated(file))
        .cloned()
        .collect();

    Ok(MigrationResult {
        replacements,
        stats: outcome.stats,
        imports_removed: outcome.removed_imports,
        partially_migrated,
        outputs,
    })
}

pub struct MigrationEngine<S: Storage, C: ConfigProvider> {
    sources: S,
    output: S,
    config: C,
    monitor_enabled: bool,
}

impl<S: Storage, C: ConfigProvider> MigrationEngine<S, C> {
    pub fn new(sources: S, output: S, config: C) -> Self {
        Self::new_with_monitoring(sources, output, config, false)
    }

    pub fn new_with_monitoring(sources: S, output: S, config: C, monitor_enabled: bool) -> Self {
        Self {
            sources,
            output,
            config,
            monitor_enabled,
        }
    }

    pub fn options(&self) -> MigrationOptions {
        MigrationOptions {
            insert_todos_for_skipped_fields: self.config.insert_todos_for_skipped_fields(),
            legacy_import: ImportSpecifier::new(
                self.config.legacy_symbol(),
                self.config.core_module(),
            ),
        }
    }

    pub async fn load_plan(&self) -> Result<MigrationPlan> {
        let data = self.sources.read_file(self.config.plan_path()).await?;
        let plan = MigrationPlan::from_json_slice(&data)?;
        plan.validate()?;
        Ok(plan)
    }

    pub async fn load_program(&self, plan: &MigrationPlan) -> Result<Program> {
        let mut program = Program::new();
        for file in plan.referenced_files() {
            let data = self.sources.read_file(file.as_str()).await?;
            let text = String::from_utf8(data).map_err(|e| {
                MigrateError::plan(format!("{} is not valid UTF-8: {}", file, e))
            })?;
            program.add_file(file, text);
        }
        plan.validate_against(&program)?;
        Ok(program)
    }

    pub async fn run(&self) -> Result<MigrationReport> {
        let mut monitor = PhaseMonitor::new(self.monitor_enabled);
        tracing::info!("Starting signal input migration...");

        let plan = self.load_plan().await?;
        let program = self.load_program(&plan).await?;
        tracing::info!(
            "Loaded {} inputs across {} files",
            plan.inputs.len(),
            program.len()
        );
        monitor.finish_phase("load");

        let signal_import =
            ImportSpecifier::new(self.config.signal_symbol(), self.config.core_module());
        let result = migrate_program(&plan, &program, &self.options(), signal_import)?;
        tracing::info!(
            "Produced {} edits for {} files",
            result.replacements.len(),
            result.outputs.len()
        );
        monitor.finish_phase("migrate");

        let dry_run = self.config.dry_run();
        if dry_run {
            tracing::info!("🔍 Dry run, nothing written");
        } else {
            for (file, text) in &result.outputs {
                self.output.write_file(file.as_str(), text.as_bytes()).await?;
                tracing::debug!("Wrote {}", file);
            }
        }

        let report = MigrationReport {
            generated_at: Utc::now(),
            dry_run,
            stats: result.stats,
            edits: result.replacements.len(),
            files_changed: result.outputs.keys().cloned().collect(),
            imports_removed: result.imports_removed,
            partially_migrated: result.partially_migrated,
        };

        if !dry_run {
            let json = serde_json::to_vec_pretty(&report)?;
            self.output
                .write_file(self.config.report_filename(), &json)
                .await?;
        }
        monitor.finish_phase("write");
        monitor.log_final_stats();

        Ok(report)
    }
}
