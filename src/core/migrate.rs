//! Replacement generation and import consistency for legacy input declarations.
//!
//! The pass runs in two strictly ordered phases:
//!
//! 1. every registry entry is visited once and either skipped (optionally leaving TODO
//!    edits behind) or replaced by its signal input form;
//! 2. once all entries are visited, each file that had at least one migration and no
//!    skipped declaration drops its legacy import.
//!
//! A file's import decision depends on declarations that can appear anywhere in registry
//! order, so phase 2 never starts before phase 1 has seen the whole registry.

use crate::core::replacement::{Replacement, ReplacementSet, TextUpdate};
use crate::domain::model::{
    Classification, Declaration, ImportSpecifier, IncompatibilityInfo, IncompatibilityReason,
    InputMetadata, Program, ProjectFile, RegistryEntry,
};
use crate::domain::ports::{DeclarationRegistry, ImportRegistrar, TextSynthesizer, TodoAnnotator};
use crate::utils::error::{MigrateError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOptions {
    pub insert_todos_for_skipped_fields: bool,
    /// The annotation import that becomes unused once a file is fully migrated.
    pub legacy_import: ImportSpecifier,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            insert_todos_for_skipped_fields: false,
            legacy_import: ImportSpecifier::new("Input", "@angular/core"),
        }
    }
}

/// Which files gained a migrated declaration and which still hold a skipped one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMigrationStatus {
    migrated: BTreeSet<ProjectFile>,
    unmigrated: BTreeSet<ProjectFile>,
}

impl FileMigrationStatus {
    pub fn has_migrated(&self, file: &ProjectFile) -> bool {
        self.migrated.contains(file)
    }

    pub fn has_unmigrated(&self, file: &ProjectFile) -> bool {
        self.unmigrated.contains(file)
    }

    pub fn migrated_files(&self) -> impl Iterator<Item = &ProjectFile> {
        self.migrated.iter()
    }

    pub fn unmigrated_files(&self) -> impl Iterator<Item = &ProjectFile> {
        self.unmigrated.iter()
    }

    /// Files whose legacy import can go: migrated something, skipped nothing.
    pub fn fully_migrated_files(&self) -> impl Iterator<Item = &ProjectFile> {
        self.migrated.difference(&self.unmigrated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationOutcome {
    Migrated,
    Skipped { todo_edits: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationStats {
    pub migrated: usize,
    pub skipped: usize,
    pub todo_edits: usize,
    pub skipped_by_reason: BTreeMap<IncompatibilityReason, usize>,
}

impl MigrationStats {
    fn record(&mut self, outcome: DeclarationOutcome, reason: Option<IncompatibilityReason>) {
        match outcome {
            DeclarationOutcome::Migrated => self.migrated += 1,
            DeclarationOutcome::Skipped { todo_edits } => {
                self.skipped += 1;
                self.todo_edits += todo_edits;
                if let Some(reason) = reason {
                    *self.skipped_by_reason.entry(reason).or_insert(0) += 1;
                }
            }
        }
    }

    pub fn total(&self) -> usize {
        self.migrated + self.skipped
    }
}

#[derive(Debug, Clone, Default)]
pub struct MigrationOutcome {
    pub stats: MigrationStats,
    pub status: FileMigrationStatus,
    pub removed_imports: Vec<ProjectFile>,
}

pub struct MigrationPass<'a, S: TextSynthesizer, A: TodoAnnotator> {
    synthesizer: &'a S,
    annotator: &'a A,
    options: &'a MigrationOptions,
}

impl<'a, S: TextSynthesizer, A: TodoAnnotator> MigrationPass<'a, S, A> {
    pub fn new(synthesizer: &'a S, annotator: &'a A, options: &'a MigrationOptions) -> Self {
        Self {
            synthesizer,
            annotator,
            options,
        }
    }

    /// Run both phases over `registry`, appending edits to `replacements` and issuing
    /// import commands to `imports`. Aborts on the first contract violation.
    pub fn run<R, I>(
        &self,
        registry: &R,
        program: &Program,
        replacements: &mut ReplacementSet,
        imports: &mut I,
    ) -> Result<MigrationOutcome>
    where
        R: DeclarationRegistry,
        I: ImportRegistrar,
    {
        let mut outcome = MigrationOutcome::default();

        for entry in registry.entries() {
            let result =
                self.migrate_declaration(entry, program, replacements, imports, &mut outcome.status);
            let decision = match result {
                Ok(decision) => decision,
                Err(e) => {
                    tracing::error!("❌ Aborting migration at '{}': {}", entry.declaration.id, e);
                    return Err(e);
                }
            };
            let reason = match &entry.classification {
                Classification::Incompatible(info) => Some(info.reason),
                Classification::Compatible => None,
            };
            outcome.stats.record(decision, reason);
        }

        tracing::info!(
            "Visited {} inputs: {} migrated, {} skipped",
            outcome.stats.total(),
            outcome.stats.migrated,
            outcome.stats.skipped
        );

        outcome.removed_imports = reconcile_imports(&outcome.status, imports, self.options);
        Ok(outcome)
    }

    /// Phase 1 for a single entry: exactly one of the skip or migrate paths.
    pub fn migrate_declaration<I: ImportRegistrar>(
        &self,
        entry: &RegistryEntry,
        program: &Program,
        replacements: &mut ReplacementSet,
        imports: &mut I,
        status: &mut FileMigrationStatus,
    ) -> Result<DeclarationOutcome> {
        let declaration = &entry.declaration;

        match &entry.classification {
            Classification::Incompatible(info) => {
                let todo_edits = self.skip(declaration, info, program, replacements);
                status.unmigrated.insert(declaration.file.clone());
                Ok(DeclarationOutcome::Skipped { todo_edits })
            }
            Classification::Compatible => {
                let metadata = require_metadata(declaration, entry.metadata.as_ref())?;
                let to_insert = self
                    .synthesizer
                    .synthesize(declaration, metadata, program, &mut *imports)?;

                tracing::debug!("Migrating '{}' in {}", declaration.id, declaration.file);
                replacements.push(Replacement::new(
                    declaration.file.clone(),
                    TextUpdate::replace(declaration.range, to_insert),
                ));
                status.migrated.insert(declaration.file.clone());
                Ok(DeclarationOutcome::Migrated)
            }
        }
    }

    fn skip(
        &self,
        declaration: &Declaration,
        info: &IncompatibilityInfo,
        program: &Program,
        replacements: &mut ReplacementSet,
    ) -> usize {
        tracing::debug!(
            "Skipping '{}' in {} ({})",
            declaration.id,
            declaration.file,
            info.reason
        );

        if !self.options.insert_todos_for_skipped_fields {
            return 0;
        }

        let edits = self.annotator.annotate(declaration, program, info);
        let count = edits.len();
        replacements.extend(edits);
        count
    }
}

fn require_metadata<'m>(
    declaration: &Declaration,
    metadata: Option<&'m InputMetadata>,
) -> Result<&'m InputMetadata> {
    let metadata = metadata.ok_or_else(|| {
        MigrateError::contract(&declaration.id, "compatible input has no metadata")
    })?;
    if declaration.is_accessor() {
        return Err(MigrateError::contract(
            &declaration.id,
            "accessor inputs must be classified as incompatible",
        ));
    }
    Ok(metadata)
}

/// Phase 2: drop the legacy import from every fully migrated file.
pub fn reconcile_imports<I: ImportRegistrar>(
    status: &FileMigrationStatus,
    imports: &mut I,
    options: &MigrationOptions,
) -> Vec<ProjectFile> {
    let legacy = &options.legacy_import;
    let mut removed = Vec::new();

    for file in status.fully_migrated_files() {
        imports.remove_import(file, &legacy.symbol, &legacy.module);
        removed.push(file.clone());
    }

    let kept = status
        .migrated_files()
        .filter(|file| status.has_unmigrated(file))
        .count();
    tracing::info!(
        "Removed '{}' import from {} files, kept it in {} partially migrated files",
        legacy.symbol,
        removed.len(),
        kept
    );

    removed
}
