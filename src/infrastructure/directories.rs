use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::config::DirectoryConfig;

/// Absolute locations the host writes to.
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub logs_dir: PathBuf,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
}

pub fn ensure_directories(cfg: &DirectoryConfig) -> Result<ResolvedPaths> {
    let logs_dir = create_dir(Path::new(&cfg.logs_dir))?;
    let data_dir = create_dir(Path::new(&cfg.data_dir))?;
    check_writable(&data_dir)?;

    Ok(ResolvedPaths {
        db_path: data_dir.join(&cfg.db_filename),
        logs_dir,
        data_dir,
    })
}

fn create_dir(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;
    Ok(dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf()))
}

/// Fails early when the database directory is read-only.
fn check_writable(dir: &Path) -> Result<()> {
    let marker = dir.join(".write-test");
    fs::write(&marker, b"ok")
        .with_context(|| format!("data directory {} is not writable", dir.display()))?;
    fs::remove_file(&marker)
        .with_context(|| format!("failed to remove {}", marker.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_directories_and_resolves_db_path() {
        let root = tempfile::tempdir().unwrap();
        let cfg = DirectoryConfig {
            logs_dir: root.path().join("logs").display().to_string(),
            data_dir: root.path().join("nested/data").display().to_string(),
            db_filename: "guardian.db".to_string(),
        };

        let paths = ensure_directories(&cfg).unwrap();
        assert!(paths.logs_dir.is_dir());
        assert!(paths.data_dir.is_dir());
        assert!(paths.data_dir.is_absolute());
        assert_eq!(paths.db_path, paths.data_dir.join("guardian.db"));
        assert!(!paths.data_dir.join(".write-test").exists());
    }

    #[test]
    fn test_existing_directories_are_reused() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().display().to_string();
        let cfg = DirectoryConfig {
            logs_dir: dir.clone(),
            data_dir: dir,
            db_filename: "kv.db".to_string(),
        };

        let paths = ensure_directories(&cfg).unwrap();
        assert_eq!(paths.logs_dir, paths.data_dir);
    }
}
