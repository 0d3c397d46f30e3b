use crate::domain::model::{Program, ProjectFile, RegistryEntry};
use crate::domain::ports::DeclarationRegistry;
use crate::utils::error::{MigrateError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::{Component, Path};

/// Serialized declaration registry produced by the analysis passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationPlan {
    #[serde(default)]
    pub inputs: Vec<RegistryEntry>,
}

impl MigrationPlan {
    pub fn from_json_slice(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// 依第一次出現的順序列出所有被參照的檔案
    pub fn referenced_files(&self) -> Vec<ProjectFile> {
        let mut seen = BTreeSet::new();
        self.inputs
            .iter()
            .filter(|entry| seen.insert(entry.declaration.file.clone()))
            .map(|entry| entry.declaration.file.clone())
            .collect()
    }

    /// Checks every declaration range against the loaded sources.
    pub fn validate_against(&self, program: &Program) -> Result<()> {
        for entry in &self.inputs {
            let declaration = &entry.declaration;
            let source = program
                .file(&declaration.file)
                .ok_or_else(|| MigrateError::UnknownFile {
                    file: declaration.file.to_string(),
                })?;

            let range = declaration.range;
            if range.end > source.text.len()
                || !source.text.is_char_boundary(range.start)
                || !source.text.is_char_boundary(range.end)
            {
                return Err(MigrateError::InvalidRange {
                    file: declaration.file.to_string(),
                    start: range.start,
                    end: range.end,
                    len: source.text.len(),
                });
            }
        }
        Ok(())
    }
}

impl DeclarationRegistry for MigrationPlan {
    fn entries(&self) -> impl Iterator<Item = &RegistryEntry> + '_ {
        self.inputs.iter()
    }
}

impl Validate for MigrationPlan {
    fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for entry in &self.inputs {
            let declaration = &entry.declaration;
            if declaration.id.trim().is_empty() {
                return Err(MigrateError::plan(format!(
                    "input '{}' in {} has an empty id",
                    declaration.name, declaration.file
                )));
            }
            if !ids.insert(declaration.id.as_str()) {
                return Err(MigrateError::plan(format!(
                    "duplicate input id '{}'",
                    declaration.id
                )));
            }
            // 檔案路徑必須是專案內的相對路徑，輸出時才能寫回同一棵樹
            let escapes = Path::new(declaration.file.as_str())
                .components()
                .any(|c| {
                    matches!(
                        c,
                        Component::ParentDir | Component::RootDir | Component::Prefix(_)
                    )
                });
            if escapes {
                return Err(MigrateError::plan(format!(
                    "input '{}' points outside the project: {}",
                    declaration.id, declaration.file
                )));
            }
            if declaration.range.start > declaration.range.end {
                return Err(MigrateError::plan(format!(
                    "input '{}' has an inverted range {}",
                    declaration.id, declaration.range
                )));
            }
        }
        Ok(())
    }
}
