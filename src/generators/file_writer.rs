use std::fs;
use std::path::Path;

use tracing::info;

use crate::utils::error::{AppError, Result};

/// 验证器文件写入
///
/// 默认拒绝覆盖已存在的文件，必要时自动创建父目录。
pub struct ValidatorFileWriter;

impl ValidatorFileWriter {
    pub fn write(path: &Path, content: &str, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(AppError::InvalidInput(format!(
                "File already exists: {} (use --force to overwrite)",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, content)?;
        info!("Wrote validator file: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app/validation/UserValidator.php");

        ValidatorFileWriter::write(&path, "<?php\n", false).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<?php\n");
    }

    #[test]
    fn test_write_refuses_existing_file_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("UserValidator.php");
        fs::write(&path, "original").unwrap();

        let err = ValidatorFileWriter::write(&path, "replacement", false).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn test_write_overwrites_with_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("UserValidator.php");
        fs::write(&path, "original").unwrap();

        ValidatorFileWriter::write(&path, "replacement", true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "replacement");
    }
}
