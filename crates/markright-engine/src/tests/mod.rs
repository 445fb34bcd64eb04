use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

pub fn create_test_workspace() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Writes `content` to `name` under the workspace, creating parent folders.
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(name);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    fs::write(&file_path, content).expect("Failed to write test file");
    file_path
}
