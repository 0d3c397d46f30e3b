use crate::domain::model::{ProjectFile, TextRange};
use crate::utils::error::{MigrateError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Replace `[position, end)` with `to_insert`. A zero-length range is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextUpdate {
    pub position: usize,
    pub end: usize,
    pub to_insert: String,
}

impl TextUpdate {
    pub fn replace(range: TextRange, to_insert: impl Into<String>) -> Self {
        Self {
            position: range.start,
            end: range.end,
            to_insert: to_insert.into(),
        }
    }

    pub fn insert(position: usize, to_insert: impl Into<String>) -> Self {
        Self {
            position,
            end: position,
            to_insert: to_insert.into(),
        }
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.position, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub file: ProjectFile,
    pub update: TextUpdate,
}

impl Replacement {
    pub fn new(file: ProjectFile, update: TextUpdate) -> Self {
        Self { file, update }
    }
}

/// Append-only edit collection, partitioned by file. Per-file order is append order.
#[derive(Debug, Clone, Default)]
pub struct ReplacementSet {
    by_file: BTreeMap<ProjectFile, Vec<TextUpdate>>,
    total: usize,
}

impl ReplacementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, replacement: Replacement) {
        self.by_file
            .entry(replacement.file)
            .or_default()
            .push(replacement.update);
        self.total += 1;
    }

    pub fn for_file(&self, file: &ProjectFile) -> &[TextUpdate] {
        self.by_file.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn files(&self) -> impl Iterator<Item = &ProjectFile> {
        self.by_file.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProjectFile, &[TextUpdate])> {
        self.by_file
            .iter()
            .map(|(file, updates)| (file, updates.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Fails on the first pair of same-file edits whose ranges overlap.
    pub fn check_disjoint(&self) -> Result<()> {
        for (file, updates) in &self.by_file {
            check_updates_disjoint(file, updates)?;
        }
        Ok(())
    }
}

impl Extend<Replacement> for ReplacementSet {
    fn extend<T: IntoIterator<Item = Replacement>>(&mut self, iter: T) {
        for replacement in iter {
            self.push(replacement);
        }
    }
}

pub(crate) fn check_updates_disjoint(file: &ProjectFile, updates: &[TextUpdate]) -> Result<()> {
    let mut ordered: Vec<&TextUpdate> = updates.iter().collect();
    ordered.sort_by_key(|u| (u.position, u.end));

    // 排序後只需比較相鄰非空範圍；插入點另外對照所有非空範圍
    let mut last_non_empty: Option<&TextUpdate> = None;
    for update in &ordered {
        if let Some(previous) = last_non_empty {
            if previous.range().overlaps(&update.range()) {
                return Err(overlap_error(file, previous, update));
            }
        }
        if !update.range().is_empty() {
            last_non_empty = Some(update);
        }
    }
    Ok(())
}

fn overlap_error(file: &ProjectFile, first: &TextUpdate, second: &TextUpdate) -> MigrateError {
    MigrateError::OverlappingEdits {
        file: file.to_string(),
        first: first.range().to_string(),
        second: second.range().to_string(),
    }
}
