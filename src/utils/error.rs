use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Migration plan error: {message}")]
    PlanError { message: String },

    #[error("File '{file}' is not part of the loaded program")]
    UnknownFile { file: String },

    #[error("Range {start}..{end} is invalid for '{file}' ({len} bytes)")]
    InvalidRange {
        file: String,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Overlapping edits in '{file}': {first} and {second}")]
    OverlappingEdits {
        file: String,
        first: String,
        second: String,
    },

    #[error("Contract violation for '{declaration}': {message}")]
    ContractViolation {
        declaration: String,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Plan,
    Edit,
    Contract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MigrateError {
    pub fn contract(declaration: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ContractViolation {
            declaration: declaration.into(),
            message: message.into(),
        }
    }

    pub fn plan(message: impl Into<String>) -> Self {
        Self::PlanError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MigrateError::IoError(_) => ErrorCategory::Io,
            MigrateError::ConfigValidationError { .. }
            | MigrateError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            MigrateError::SerializationError(_)
            | MigrateError::PlanError { .. }
            | MigrateError::UnknownFile { .. } => ErrorCategory::Plan,
            MigrateError::InvalidRange { .. } | MigrateError::OverlappingEdits { .. } => {
                ErrorCategory::Edit
            }
            MigrateError::ContractViolation { .. } => ErrorCategory::Contract,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Io => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Plan => ErrorSeverity::High,
            // 編輯衝突或上游分類器違約：輸出已不可信
            ErrorCategory::Edit | ErrorCategory::Contract => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "Check that the project root and output path exist and are writable",
            ErrorCategory::Configuration => "Fix the configuration value and run again",
            ErrorCategory::Plan => {
                "Regenerate the migration plan; it does not match the sources on disk"
            }
            ErrorCategory::Edit => {
                "Report this as a bug: two edits touched the same source range"
            }
            ErrorCategory::Contract => {
                "Report this as a bug in the classifier: a compatible input broke its contract"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MigrateError::IoError(e) => format!("Could not read or write a file: {}", e),
            MigrateError::SerializationError(e) => {
                format!("The migration plan is not valid JSON: {}", e)
            }
            MigrateError::ContractViolation { declaration, .. } => format!(
                "Migration aborted at '{}'; no files were written",
                declaration
            ),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
