//! Flat-file history store: one URL per line, most recent first.

use super::PasteHistory;
use crate::error::HistoryError;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Read history from `path`.
///
/// A missing file is an empty history. Blank lines are skipped and only the
/// first `capacity` URLs are kept.
///
/// # Errors
/// [`HistoryError::Read`] for any other I/O failure.
pub fn load(path: &Path, capacity: usize) -> Result<PasteHistory, HistoryError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("no history file at {}", path.display());
            return Ok(PasteHistory::new(capacity));
        }
        Err(source) => {
            return Err(HistoryError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let urls = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());
    Ok(PasteHistory::from_entries(capacity, urls))
}

/// Write `history` to `path`, creating parent directories.
///
/// The file is replaced through a sibling temp file so a crash never leaves
/// a half-written list.
///
/// # Errors
/// [`HistoryError::Write`] when the directory or file cannot be written.
pub fn save(path: &Path, history: &PasteHistory) -> Result<(), HistoryError> {
    write_atomically(path, history).map_err(|source| HistoryError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomically(path: &Path, history: &PasteHistory) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);
    let written = write_lines(tmp_path, history).and_then(|()| fs::rename(tmp_path, path));
    if written.is_err() {
        let _ = fs::remove_file(tmp_path);
    }
    written
}

fn write_lines(path: &Path, history: &PasteHistory) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    for url in history.iter() {
        writeln!(file, "{}", url)?;
    }
    file.sync_all()
}
