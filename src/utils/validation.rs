use crate::utils::error::{MigrateError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MigrateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MigrateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MigrateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 匯入的符號名稱必須是合法的 JS 識別字
pub fn validate_identifier(field_name: &str, value: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };

    if !valid {
        return Err(MigrateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a valid identifier".to_string(),
        });
    }
    Ok(())
}

pub fn validate_module_specifier(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    if value.contains(['\'', '"', '\n']) {
        return Err(MigrateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Module specifier cannot contain quotes or line breaks".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output.path", "./out").is_ok());
        assert!(validate_path("output.path", "").is_err());
        assert!(validate_path("output.path", "a\0b").is_err());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("migration.legacy_symbol", "Input").is_ok());
        assert!(validate_identifier("migration.signal_symbol", "$input_2").is_ok());
        assert!(validate_identifier("migration.signal_symbol", "2input").is_err());
        assert!(validate_identifier("migration.signal_symbol", "in put").is_err());
        assert!(validate_identifier("migration.signal_symbol", "").is_err());
    }

    #[test]
    fn test_validate_module_specifier() {
        assert!(validate_module_specifier("migration.core_module", "@angular/core").is_ok());
        assert!(validate_module_specifier("migration.core_module", "  ").is_err());
        assert!(validate_module_specifier("migration.core_module", "a'b").is_err());
    }
}
