use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Root-relative path of a source file, used as the per-file partition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectFile(String);

impl ProjectFile {
    pub fn new(path: impl Into<String>) -> Self {
        // 統一使用正斜線，避免 Windows 路徑造成重複的檔案鍵
        Self(path.into().replace('\\', "/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Half-open byte range `[start, end)` into the original file text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// An insertion only conflicts with a range it lands strictly inside of.
    pub fn overlaps(&self, other: &TextRange) -> bool {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => false,
            (true, false) => other.start < self.start && self.start < other.end,
            (false, true) => self.start < other.start && other.start < self.end,
            (false, false) => self.start < other.end && other.start < self.end,
        }
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberForm {
    Property,
    Accessor,
}

/// One class member annotated as a legacy input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub id: String,
    pub file: ProjectFile,
    pub class_name: String,
    pub name: String,
    pub range: TextRange,
    #[serde(default = "default_member_form")]
    pub form: MemberForm,
}

fn default_member_form() -> MemberForm {
    MemberForm::Property
}

impl Declaration {
    pub fn is_accessor(&self) -> bool {
        self.form == MemberForm::Accessor
    }
}

/// Everything the text synthesizer needs; only present for compatible declarations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputMetadata {
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub initializer: Option<String>,
    #[serde(default)]
    pub type_annotation: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub transform: Option<String>,
    #[serde(default)]
    pub question_mark: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncompatibilityReason {
    Accessor,
    WriteAssignment,
    OverriddenByDerivedClass,
    RedeclaredViaDerivedClassInputsArray,
    TypeConflictWithBaseClass,
    ParentIsIncompatible,
    SpyOnThatOverwritesField,
    PotentiallyNarrowedInTemplate,
    RequiredButNoExplicitType,
    OptionalButNoExplicitType,
    SignalIncompatibleWithHostBinding,
    OutsideOfMigrationScope,
    SkippedViaConfigFilter,
    ClassManuallyInstantiated,
    OwningClassReferencedInClassProperty,
}

impl IncompatibilityReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accessor => "accessor",
            Self::WriteAssignment => "write_assignment",
            Self::OverriddenByDerivedClass => "overridden_by_derived_class",
            Self::RedeclaredViaDerivedClassInputsArray => {
                "redeclared_via_derived_class_inputs_array"
            }
            Self::TypeConflictWithBaseClass => "type_conflict_with_base_class",
            Self::ParentIsIncompatible => "parent_is_incompatible",
            Self::SpyOnThatOverwritesField => "spy_on_that_overwrites_field",
            Self::PotentiallyNarrowedInTemplate => "potentially_narrowed_in_template",
            Self::RequiredButNoExplicitType => "required_but_no_explicit_type",
            Self::OptionalButNoExplicitType => "optional_but_no_explicit_type",
            Self::SignalIncompatibleWithHostBinding => "signal_incompatible_with_host_binding",
            Self::OutsideOfMigrationScope => "outside_of_migration_scope",
            Self::SkippedViaConfigFilter => "skipped_via_config_filter",
            Self::ClassManuallyInstantiated => "class_manually_instantiated",
            Self::OwningClassReferencedInClassProperty => {
                "owning_class_referenced_in_class_property"
            }
        }
    }

    /// Human readable explanation, used for TODO comments and reports.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Accessor => "Accessor inputs cannot be migrated as they are too complex.",
            Self::WriteAssignment => {
                "Your application code writes to the input. This prevents migration."
            }
            Self::OverriddenByDerivedClass => {
                "The input cannot be migrated because it is overridden by a derived class."
            }
            Self::RedeclaredViaDerivedClassInputsArray => {
                "The input is overridden by a subclass that cannot be migrated."
            }
            Self::TypeConflictWithBaseClass => {
                "This input overrides a field from a superclass, while the superclass field is not migrated."
            }
            Self::ParentIsIncompatible => {
                "This input inherits from a superclass field that cannot be migrated."
            }
            Self::SpyOnThatOverwritesField => {
                "A jasmine `spyOn` call spies on this input. This breaks with signal inputs."
            }
            Self::PotentiallyNarrowedInTemplate => {
                "This input is used in a control flow expression (e.g. `@if` or `*ngIf`) and migrating would break narrowing currently."
            }
            Self::RequiredButNoExplicitType => {
                "Input is required, but the migration cannot determine a good type for the input."
            }
            Self::OptionalButNoExplicitType => {
                "Input is marked with a question mark. Migration could not determine a good type for the input."
            }
            Self::SignalIncompatibleWithHostBinding => {
                "This input is used in combination with `@HostBinding` and migrating would break."
            }
            Self::OutsideOfMigrationScope => {
                "This input is not part of any source files in your project. The migration excludes inputs if no source file declaring the input was seen."
            }
            Self::SkippedViaConfigFilter => "This input is not part of the current migration scope.",
            Self::ClassManuallyInstantiated => {
                "Class of this input is manually instantiated. This is discouraged and prevents migration."
            }
            Self::OwningClassReferencedInClassProperty => {
                "Class of this input is referenced in the signature of another class."
            }
        }
    }
}

impl fmt::Display for IncompatibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompatibilityInfo {
    pub reason: IncompatibilityReason,
    #[serde(default)]
    pub context: Option<String>,
}

impl IncompatibilityInfo {
    pub fn new(reason: IncompatibilityReason) -> Self {
        Self {
            reason,
            context: None,
        }
    }
}

/// Classifier verdict; set upstream, read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Classification {
    Compatible,
    Incompatible(IncompatibilityInfo),
}

impl Classification {
    pub fn incompatible(reason: IncompatibilityReason) -> Self {
        Self::Incompatible(IncompatibilityInfo::new(reason))
    }

    pub fn is_compatible(&self) -> bool {
        matches!(self, Self::Compatible)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub declaration: Declaration,
    pub classification: Classification,
    #[serde(default)]
    pub metadata: Option<InputMetadata>,
}

/// A named import `symbol` from `module`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub symbol: String,
    pub module: String,
}

impl ImportSpecifier {
    pub fn new(symbol: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            module: module.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub file: ProjectFile,
    pub text: String,
}

impl SourceFile {
    /// Leading whitespace of the line containing `offset`.
    pub fn indentation_at(&self, offset: usize) -> &str {
        let offset = offset.min(self.text.len());
        let line_start = self.text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line = &self.text[line_start..];
        let indent_len = line
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(line.len());
        &line[..indent_len]
    }
}

/// The already-loaded program the pass operates over.
#[derive(Debug, Clone, Default)]
pub struct Program {
    files: BTreeMap<ProjectFile, SourceFile>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, file: ProjectFile, text: impl Into<String>) {
        let source = SourceFile {
            file: file.clone(),
            text: text.into(),
        };
        self.files.insert(file, source);
    }

    pub fn file(&self, file: &ProjectFile) -> Option<&SourceFile> {
        self.files.get(file)
    }

    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
