//! In-memory zip expansion into the file tree.

use crate::classify::is_likely_text;
use crate::ingest::{skip_too_deep, text_content};
use crate::pattern::PatternFilter;
use crate::tree::{DirectoryNode, FileContent, TreeError};
use std::io::{Cursor, Read};
use thiserror::Error;
use tracing::{debug, info};
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to open archive {name:?}: {source}")]
    Open {
        name: String,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("failed to read entry {index} of archive {name:?}: {source}")]
    Entry {
        name: String,
        index: usize,
        #[source]
        source: zip::result::ZipError,
    },
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Metadata read from the central directory before any decompression.
struct EntryMeta {
    path: String,
    is_dir: bool,
    size: u64,
}

/// Expands `bytes` entry by entry, in archive order, into `root`.
///
/// Directory entries always create directory nodes. File entries are
/// filtered by `filter` and `ceiling` before anything is decompressed.
/// Decompression or UTF-8 failures leave the entry as
/// [`FileContent::NonText`] instead of failing the run, and entries nested
/// deeper than [`crate::tree::MAX_DEPTH`] are skipped.
pub fn expand_archive(
    name: &str,
    bytes: &[u8],
    root: &mut DirectoryNode,
    filter: &PatternFilter,
    ceiling: u64,
) -> Result<(), ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|source| ArchiveError::Open {
        name: name.to_string(),
        source,
    })?;
    info!(archive = name, entries = archive.len(), "Expanding archive");

    let (mut inserted, mut skipped, mut directories) = (0usize, 0usize, 0usize);
    for index in 0..archive.len() {
        let meta = {
            let entry = archive
                .by_index_raw(index)
                .map_err(|source| ArchiveError::Entry {
                    name: name.to_string(),
                    index,
                    source,
                })?;
            EntryMeta {
                path: entry.name().to_string(),
                is_dir: entry.is_dir(),
                size: entry.size(),
            }
        };

        if meta.is_dir {
            if skip_too_deep(root.ensure_path(meta.path.split('/')))? {
                skipped += 1;
            } else {
                directories += 1;
            }
            continue;
        }
        if !filter.accepts(&meta.path) {
            debug!(path = %meta.path, "Entry filtered out");
            skipped += 1;
            continue;
        }
        if meta.size > ceiling {
            debug!(path = %meta.path, size = meta.size, ceiling, "Entry exceeds size ceiling");
            skipped += 1;
            continue;
        }

        let content = if is_likely_text(&meta.path) && meta.size > 0 {
            text_content(&meta.path, read_entry_text(&mut archive, index))
        } else {
            FileContent::NonText
        };

        if skip_too_deep(root.insert_file(&meta.path, meta.size, content))? {
            skipped += 1;
        } else {
            inserted += 1;
        }
    }

    info!(
        archive = name,
        inserted,
        skipped,
        directories,
        "Archive expanded"
    );
    Ok(())
}

/// Decompresses one entry and decodes it as UTF-8; any failure yields `None`.
fn read_entry_text(archive: &mut ZipArchive<Cursor<&[u8]>>, index: usize) -> Option<String> {
    let mut entry = match archive.by_index(index) {
        Ok(entry) => entry,
        Err(e) => {
            debug!(index, error = %e, "Failed to open entry for decompression");
            return None;
        }
    };
    let mut buf = Vec::new();
    if let Err(e) = entry.read_to_end(&mut buf) {
        debug!(index, error = %e, "Failed to decompress entry");
        return None;
    }
    String::from_utf8(buf).ok()
}
