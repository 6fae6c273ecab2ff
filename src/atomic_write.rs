//! Atomic whole-file writes (temp file + fsync + rename).
//!
//! The staged input file is overwritten on every run. Writing through a
//! temporary file in the same directory and renaming into place means the
//! engine can never observe a half-written request, even if the front end
//! dies mid-write.

use camino::Utf8Path;
use std::io::{self, Write};
use tempfile::NamedTempFile;

/// Atomically replace `path` with `content`.
///
/// The temporary file is created in the target's directory so the final
/// rename stays on one filesystem.
pub fn write_file_atomic(path: &Utf8Path, content: &str) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
