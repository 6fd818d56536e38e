use std::fs;
use std::path::{Path, PathBuf};

use super::compiler::{ContentCompileError, ContentErrorCode};
use super::DEF_FILE_EXTENSION;

/// Collects the campaign's def files in a deterministic (sorted) order so
/// later files win override conflicts reproducibly.
pub(crate) fn collect_def_files_sorted(
    defs_dir: &Path,
) -> Result<Vec<PathBuf>, ContentCompileError> {
    if !defs_dir.is_dir() {
        return Err(ContentCompileError {
            code: ContentErrorCode::Discovery,
            message: format!("campaign defs directory not found: {}", defs_dir.display()),
            file_path: defs_dir.to_path_buf(),
            location: None,
        });
    }

    let entries = fs::read_dir(defs_dir).map_err(|source| ContentCompileError {
        code: ContentErrorCode::Discovery,
        message: format!("failed to read defs directory: {source}"),
        file_path: defs_dir.to_path_buf(),
        location: None,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ContentCompileError {
            code: ContentErrorCode::Discovery,
            message: format!("failed to read defs directory entry: {source}"),
            file_path: defs_dir.to_path_buf(),
            location: None,
        })?;
        let path = entry.path();
        let is_def_file = path.is_file()
            && path
                .extension()
                .is_some_and(|extension| extension == DEF_FILE_EXTENSION);
        if is_def_file {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
