//! Small filesystem helpers shared across the pipeline.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

/// Get the modification time of a file.
pub fn get_file_mtime(path: &Path) -> Result<SystemTime> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read metadata for {}", path.display()))?;
    metadata
        .modified()
        .with_context(|| format!("Failed to read mtime for {}", path.display()))
}

/// Total size in bytes of all files under a directory.
pub fn calculate_directory_size(dir: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() {
            total += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_directory_size_counts_nested_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/x.txt"), b"1234").unwrap();
        fs::write(dir.path().join("a/b/y.txt"), b"56").unwrap();

        assert_eq!(calculate_directory_size(dir.path()).unwrap(), 6);
    }
}
