//! Backend documents compiled into the binary.
//!
//! Used when the user's pastebin directory is missing or empty.

use super::BackendDescriptor;
use crate::error::LoadError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `(file name, JSON document)` pairs for every bundled backend.
pub const BUNDLED_DOCUMENTS: &[(&str, &str)] = &[
    ("dpaste.json", include_str!("../../pastebins/dpaste.json")),
    ("termbin.json", include_str!("../../pastebins/termbin.json")),
];

/// Parse the bundled documents.
///
/// # Returns
/// One descriptor per bundled document, in [`BUNDLED_DOCUMENTS`] order.
pub fn descriptors() -> Result<Vec<BackendDescriptor>, LoadError> {
    BUNDLED_DOCUMENTS
        .iter()
        .map(|(file_name, text)| {
            BackendDescriptor::from_json(text).map_err(|source| LoadError::Descriptor {
                path: PathBuf::from("<bundled>").join(file_name),
                source,
            })
        })
        .collect()
}

/// Write the bundled documents into `dir` so they can be edited.
///
/// Existing files are left alone unless `overwrite` is set.
///
/// # Returns
/// Paths that were written.
pub fn export(dir: &Path, overwrite: bool) -> Result<Vec<PathBuf>, LoadError> {
    let io_error = |path: &Path, source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(|err| io_error(dir, err))?;

    let mut written = Vec::new();
    for (file_name, text) in BUNDLED_DOCUMENTS {
        let path = dir.join(file_name);
        if path.exists() && !overwrite {
            debug!("keeping existing backend document {}", path.display());
            continue;
        }
        std::fs::write(&path, text).map_err(|err| io_error(&path, err))?;
        written.push(path);
    }
    info!("exported {} backend document(s) to {}", written.len(), dir.display());
    Ok(written)
}
