use crate::core::Storage;
use crate::utils::error::{MigrateError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Filesystem storage rooted at `base_path`; used for both the project sources and the
/// migrated output tree.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// 寫入路徑不可跳出 base_path，避免計畫檔中的路徑覆寫專案外的檔案
    fn output_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if escapes {
            return Err(MigrateError::InvalidConfigValueError {
                field: "output file".to_string(),
                value: path.to_string(),
                reason: format!("must stay inside {}", self.base_path),
            });
        }
        Ok(Path::new(&self.base_path).join(relative))
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        tracing::debug!("Reading {}", full_path.display());
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.output_path(path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(temp_dir: &TempDir) -> LocalStorage {
        LocalStorage::new(temp_dir.path().to_string_lossy().into_owned())
    }

    #[tokio::test]
    async fn test_write_creates_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        storage
            .write_file("src/app/cmp.ts", b"export class Cmp {}\n")
            .await
            .unwrap();
        let data = storage.read_file("src/app/cmp.ts").await.unwrap();
        assert_eq!(data, b"export class Cmp {}\n");
    }

    #[tokio::test]
    async fn test_write_outside_base_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        let err = storage.write_file("../escape.ts", b"x").await.unwrap_err();
        assert!(matches!(err, MigrateError::InvalidConfigValueError { .. }));
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = storage(&temp_dir).read_file("missing.ts").await.unwrap_err();
        assert!(matches!(err, MigrateError::IoError(_)));
    }
}
