//! Document retrieval: the "read raw text of a named document" seam.
//!
//! Documents are addressed by paths relative to a notes root so their ids
//! stay portable across machines; everything here resolves those keys
//! against the root the caller supplies.

use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("document not found: {0}")]
    NotFound(PathBuf),
    #[error("not a notes directory: {0}")]
    NotADirectory(PathBuf),
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Reads the raw text of the document at `path` under `notes_root`.
pub fn read_file(path: &RelativePath, notes_root: &Path) -> Result<String, IoError> {
    let absolute = path.to_path(notes_root);
    if !absolute.exists() {
        return Err(IoError::NotFound(absolute));
    }
    fs::read_to_string(&absolute).map_err(|source| IoError::Read {
        path: absolute,
        source,
    })
}

/// Collects the root-relative keys of every markdown document under
/// `notes_root`, sorted for deterministic output. Hidden entries are
/// skipped.
pub fn scan_notes_dir(notes_root: &Path) -> Result<Vec<RelativePathBuf>, IoError> {
    validate_notes_dir(notes_root)?;
    let mut found = Vec::new();
    scan_into(notes_root, RelativePath::new(""), &mut found)?;
    found.sort();
    Ok(found)
}

fn scan_into(
    dir: &Path,
    prefix: &RelativePath,
    found: &mut Vec<RelativePathBuf>,
) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(|source| IoError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| IoError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        // Names that are not UTF-8 cannot become document keys.
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        let key = prefix.join(&name);
        if path.is_dir() {
            scan_into(&path, &key, found)?;
        } else if is_markdown(&name) {
            found.push(key);
        }
    }
    Ok(())
}

fn is_markdown(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Checks that `path` exists and is a directory.
pub fn validate_notes_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(IoError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}
