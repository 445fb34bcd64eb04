use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid workspace: {0}")]
    InvalidWorkspace(String),
}

/// Read a markdown file relative to the workspace root
pub fn read_file(relative_path: &RelativePath, workspace: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(workspace);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write content to a file relative to the workspace root
pub fn write_file(
    relative_path: &RelativePath,
    workspace: &Path,
    content: &str,
) -> Result<PathBuf, IoError> {
    let absolute_path = relative_path.to_path(workspace);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)?;
    Ok(absolute_path)
}

/// All files under the workspace, sorted, optionally limited to `.md`
pub fn scan_files(workspace: &Path, markdown_only: bool) -> Result<Vec<PathBuf>, IoError> {
    validate_workspace(workspace)?;

    let mut files = Vec::new();
    scan_directory_recursive(workspace, markdown_only, &mut files)?;
    files.sort();
    Ok(files)
}

/// Markdown files under the workspace, sorted
pub fn scan_markdown_files(workspace: &Path) -> Result<Vec<PathBuf>, IoError> {
    scan_files(workspace, true)
}

fn scan_directory_recursive(
    dir: &Path,
    markdown_only: bool,
    files: &mut Vec<PathBuf>,
) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, markdown_only, files)?;
        } else if !markdown_only || path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_workspace(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidWorkspace(format!(
            "workspace directory not found: {}",
            path.display()
        )));
    }

    Ok(())
}
