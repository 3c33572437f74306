use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

pub const DB_FILE_NAME: &str = "airline.db";

/// Resolve where the database lives: an explicit path wins, otherwise the
/// platform data directory. The containing directory is created if missing.
pub fn resolve_db_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    let path = match custom {
        Some(path) => path,
        None => default_data_dir()?.join(DB_FILE_NAME),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }

    Ok(path)
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "airline-db")
        .context("Could not determine data directory")?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory {:?}", dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_creates_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("flights.db");
        let resolved = resolve_db_path(Some(path.clone())).unwrap();
        assert_eq!(resolved, path);
        assert!(tmp.path().join("nested").is_dir());
    }

    #[test]
    fn test_bare_file_name() {
        let resolved = resolve_db_path(Some(PathBuf::from("airline.db"))).unwrap();
        assert_eq!(resolved, PathBuf::from("airline.db"));
    }
}
