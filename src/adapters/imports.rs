use crate::core::replacement::{Replacement, TextUpdate};
use crate::domain::model::{ImportSpecifier, Program, ProjectFile, SourceFile, TextRange};
use crate::domain::ports::ImportRegistrar;
use crate::utils::error::{MigrateError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportChange {
    Add,
    Remove,
}

fn named_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?m)^[ \t]*import[ \t]+(type[ \t]+)?\{([^}]*)\}\s*from\s*['"]([^'"]+)['"][ \t]*;?[ \t]*(\r?\n)?"#,
        )
        .expect("named import pattern is valid")
    })
}

/// Any top-level import, ending at its module specifier (the `;` is optional).
fn any_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?m)^[ \t]*import\b(?:[^'"]*?\bfrom)?[ \t]*['"][^'"\n]+['"][ \t]*;?[ \t]*(\r?\n)?"#,
        )
        .expect("import pattern is valid")
    })
}

/// One `import { ... } from 'module'` statement found in a file.
#[derive(Debug, Clone)]
struct NamedImport {
    statement: TextRange,
    specifiers: TextRange,
    module: String,
}

impl NamedImport {
    fn parse_all(text: &str) -> Vec<NamedImport> {
        named_import_re()
            .captures_iter(text)
            .filter(|caps| caps.get(1).is_none())
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let specifiers = caps.get(2)?;
                let module = caps.get(3)?;
                Some(NamedImport {
                    statement: TextRange::new(whole.start(), whole.end()),
                    specifiers: TextRange::new(specifiers.start(), specifiers.end()),
                    module: module.as_str().to_string(),
                })
            })
            .collect()
    }
}

/// Name a specifier imports, ignoring `type` prefixes and `as` aliases.
fn imported_name(specifier: &str) -> &str {
    let specifier = specifier.trim();
    let specifier = specifier.strip_prefix("type ").unwrap_or(specifier).trim_start();
    specifier.split_whitespace().next().unwrap_or(specifier)
}

/// Pending import changes per file, materialized into edits by [`finalize`].
///
/// [`finalize`]: SourceImportManager::finalize
#[derive(Debug, Clone, Default)]
pub struct SourceImportManager {
    changes: BTreeMap<ProjectFile, BTreeMap<ImportSpecifier, ImportChange>>,
}

impl SourceImportManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self, file: &ProjectFile) -> Vec<(ImportSpecifier, ImportChange)> {
        self.changes
            .get(file)
            .map(|changes| {
                changes
                    .iter()
                    .map(|(spec, change)| (spec.clone(), *change))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record(&mut self, file: &ProjectFile, symbol: &str, module: &str, change: ImportChange) {
        self.changes
            .entry(file.clone())
            .or_default()
            .insert(ImportSpecifier::new(symbol, module), change);
    }

    /// Turn the pending changes into at most one edit per import statement.
    pub fn finalize(&self, program: &Program) -> Result<Vec<Replacement>> {
        let mut replacements = Vec::new();
        for (file, changes) in &self.changes {
            let source = program.file(file).ok_or_else(|| MigrateError::UnknownFile {
                file: file.to_string(),
            })?;
            let updates = rewrite_file_imports(source, changes);
            if !updates.is_empty() {
                tracing::debug!("Rewriting {} import statements in {}", updates.len(), file);
            }
            replacements.extend(
                updates
                    .into_iter()
                    .map(|update| Replacement::new(file.clone(), update)),
            );
        }
        Ok(replacements)
    }
}

impl ImportRegistrar for SourceImportManager {
    fn register_import(&mut self, file: &ProjectFile, symbol: &str, module: &str) {
        self.record(file, symbol, module, ImportChange::Add);
    }

    fn remove_import(&mut self, file: &ProjectFile, symbol: &str, module: &str) {
        self.record(file, symbol, module, ImportChange::Remove);
    }
}

fn rewrite_file_imports(
    source: &SourceFile,
    changes: &BTreeMap<ImportSpecifier, ImportChange>,
) -> Vec<TextUpdate> {
    let text = source.text.as_str();
    let statements = NamedImport::parse_all(text);
    let mut updates = Vec::new();

    // 依模組分組，新增的符號放到該模組的第一個 import 敘述
    let mut by_module: BTreeMap<&str, Vec<(&str, ImportChange)>> = BTreeMap::new();
    for (spec, change) in changes {
        by_module
            .entry(spec.module.as_str())
            .or_default()
            .push((spec.symbol.as_str(), *change));
    }

    for (module, module_changes) in by_module {
        let module_statements: Vec<&NamedImport> =
            statements.iter().filter(|s| s.module == module).collect();

        let already_imported = |symbol: &str| {
            module_statements.iter().any(|statement| {
                let list = &text[statement.specifiers.start..statement.specifiers.end];
                list.split(',').any(|s| imported_name(s) == symbol)
            })
        };
        let additions: Vec<&str> = module_changes
            .iter()
            .filter(|(symbol, change)| *change == ImportChange::Add && !already_imported(*symbol))
            .map(|(symbol, _)| *symbol)
            .collect();
        let removals: Vec<&str> = module_changes
            .iter()
            .filter(|(_, change)| *change == ImportChange::Remove)
            .map(|(symbol, _)| *symbol)
            .collect();

        if module_statements.is_empty() {
            if !additions.is_empty() {
                updates.push(TextUpdate::insert(
                    new_import_position(text),
                    format!("import {{ {} }} from '{}';\n", additions.join(", "), module),
                ));
            }
            continue;
        }

        for (index, statement) in module_statements.iter().enumerate() {
            let to_add: &[&str] = if index == 0 { &additions } else { &[] };
            if let Some(update) = rewrite_statement(text, statement, &removals, to_add) {
                updates.push(update);
            }
        }
    }

    updates
}

fn rewrite_statement(
    text: &str,
    statement: &NamedImport,
    removals: &[&str],
    additions: &[&str],
) -> Option<TextUpdate> {
    let list = &text[statement.specifiers.start..statement.specifiers.end];
    let original: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut kept: Vec<&str> = original
        .iter()
        .copied()
        .filter(|s| !removals.contains(&imported_name(s)))
        .collect();
    if kept.len() == original.len() && additions.is_empty() {
        return None;
    }
    kept.extend_from_slice(additions);

    if kept.is_empty() {
        return Some(TextUpdate::replace(statement.statement, ""));
    }

    let padding = if list.starts_with(char::is_whitespace) { " " } else { "" };
    Some(TextUpdate::replace(
        statement.specifiers,
        format!("{}{}{}", padding, kept.join(", "), padding),
    ))
}

fn new_import_position(text: &str) -> usize {
    any_import_re()
        .find_iter(text)
        .last()
        .map(|m| m.end())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::apply::apply_text_updates;

    const CORE: &str = "@angular/core";

    fn program_with(text: &str) -> (ProjectFile, Program) {
        let file = ProjectFile::new("cmp.ts");
        let mut program = Program::new();
        program.add_file(file.clone(), text);
        (file, program)
    }

    fn finalize_text(manager: &SourceImportManager, file: &ProjectFile, program: &Program) -> String {
        let updates: Vec<TextUpdate> = manager
            .finalize(program)
            .unwrap()
            .into_iter()
            .map(|r| r.update)
            .collect();
        let text = &program.file(file).unwrap().text;
        apply_text_updates(file, text, &updates).unwrap()
    }

    #[test]
    fn test_swap_legacy_for_signal_import() {
        let (file, program) =
            program_with("import { Component, Input } from '@angular/core';\n\nclass A {}\n");
        let mut manager = SourceImportManager::new();
        manager.register_import(&file, "input", CORE);
        manager.remove_import(&file, "Input", CORE);

        assert_eq!(
            finalize_text(&manager, &file, &program),
            "import { Component, input } from '@angular/core';\n\nclass A {}\n"
        );
    }

    #[test]
    fn test_statement_removed_when_empty() {
        let (file, program) = program_with(
            "import {Input} from '@angular/core';\nimport { x } from './x';\nclass A {}\n",
        );
        let mut manager = SourceImportManager::new();
        manager.remove_import(&file, "Input", CORE);

        assert_eq!(
            finalize_text(&manager, &file, &program),
            "import { x } from './x';\nclass A {}\n"
        );
    }

    #[test]
    fn test_removing_absent_binding_is_noop() {
        let (file, program) = program_with("import { Component } from '@angular/core';\n");
        let mut manager = SourceImportManager::new();
        manager.remove_import(&file, "Input", CORE);
        assert!(manager.finalize(&program).unwrap().is_empty());
    }

    #[test]
    fn test_remove_twice_equals_remove_once() {
        let (file, program) = program_with("import { Input, Output } from '@angular/core';\n");
        let mut once = SourceImportManager::new();
        once.remove_import(&file, "Input", CORE);
        let mut twice = SourceImportManager::new();
        twice.remove_import(&file, "Input", CORE);
        twice.remove_import(&file, "Input", CORE);

        assert_eq!(once.pending(&file), twice.pending(&file));
        assert_eq!(
            finalize_text(&once, &file, &program),
            finalize_text(&twice, &file, &program)
        );
    }

    #[test]
    fn test_new_import_goes_after_last_import() {
        let (file, program) =
            program_with("import { A } from './a';\nimport B from './b';\n\nclass C {}\n");
        let mut manager = SourceImportManager::new();
        manager.register_import(&file, "input", CORE);

        assert_eq!(
            finalize_text(&manager, &file, &program),
            "import { A } from './a';\nimport B from './b';\nimport { input } from '@angular/core';\n\nclass C {}\n"
        );
    }

    #[test]
    fn test_new_import_without_semicolons() {
        let (file, program) = program_with(
            "import { A } from './a'\nimport './polyfills'\n\nclass C {\n  x = 'y'; z = 1;\n}\n",
        );
        let mut manager = SourceImportManager::new();
        manager.register_import(&file, "input", CORE);

        assert_eq!(
            finalize_text(&manager, &file, &program),
            "import { A } from './a'\nimport './polyfills'\nimport { input } from '@angular/core';\n\nclass C {\n  x = 'y'; z = 1;\n}\n"
        );
    }

    #[test]
    fn test_existing_binding_is_not_duplicated() {
        let (file, program) = program_with("import { input } from '@angular/core';\n");
        let mut manager = SourceImportManager::new();
        manager.register_import(&file, "input", CORE);
        manager.register_import(&file, "input", CORE);
        assert!(manager.finalize(&program).unwrap().is_empty());
    }

    #[test]
    fn test_aliased_and_type_only_imports() {
        let (file, program) = program_with(
            "import type { Input } from '@angular/core';\nimport { Input as In, Component } from '@angular/core';\n",
        );
        let mut manager = SourceImportManager::new();
        manager.remove_import(&file, "Input", CORE);

        assert_eq!(
            finalize_text(&manager, &file, &program),
            "import type { Input } from '@angular/core';\nimport { Component } from '@angular/core';\n"
        );
    }

    #[test]
    fn test_last_command_wins() {
        let (file, _) = program_with("");
        let mut manager = SourceImportManager::new();
        manager.register_import(&file, "Input", CORE);
        manager.remove_import(&file, "Input", CORE);
        assert_eq!(
            manager.pending(&file),
            vec![(ImportSpecifier::new("Input", CORE), ImportChange::Remove)]
        );
    }

    #[test]
    fn test_unknown_file_is_an_error() {
        let mut manager = SourceImportManager::new();
        manager.remove_import(&ProjectFile::new("ghost.ts"), "Input", CORE);
        assert!(matches!(
            manager.finalize(&Program::new()),
            Err(MigrateError::UnknownFile { .. })
        ));
    }
}
