//! Reads ingestion inputs from disk.
//!
//! A file argument becomes one input named by its file name (zip archives are
//! recognised by suffix). A directory argument is walked with an explicit
//! stack; each accepted file becomes a loose input named by its `/`-joined
//! path starting at the directory's own name. Excluded directories are pruned
//! and files that would be skipped anyway are never read.

use crate::ingest::{IngestError, IngestInput};
use crate::pattern::PatternFilter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub async fn load_inputs(
    paths: &[PathBuf],
    filter: &PatternFilter,
    ceiling: u64,
) -> Result<Vec<IngestInput>, IngestError> {
    let mut inputs = Vec::new();
    for path in paths {
        let meta = tokio::fs::metadata(path).await.map_err(|e| io_error(path, e))?;
        if meta.is_dir() {
            load_directory(path, filter, ceiling, &mut inputs).await?;
        } else {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            let bytes = tokio::fs::read(path).await.map_err(|e| io_error(path, e))?;
            debug!(path = %path.display(), size = bytes.len(), "Read input file");
            inputs.push(IngestInput::new(name, bytes));
        }
    }
    info!(count = inputs.len(), "Loaded ingestion inputs");
    Ok(inputs)
}

async fn load_directory(
    dir: &Path,
    filter: &PatternFilter,
    ceiling: u64,
    inputs: &mut Vec<IngestInput>,
) -> Result<(), IngestError> {
    let canonical = tokio::fs::canonicalize(dir).await.map_err(|e| io_error(dir, e))?;
    let top = canonical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    // (directory on disk, its relative name in the tree)
    let mut stack: Vec<(PathBuf, String)> = vec![(canonical, top)];
    while let Some((current, rel)) = stack.pop() {
        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(&current)
            .await
            .map_err(|e| io_error(&current, e))?;
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| io_error(&current, e))?
        {
            entries.push(entry);
        }
        entries.sort_by_key(|e| e.file_name());

        let mut subdirs = Vec::new();
        for entry in entries {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let rel_path = if rel.is_empty() {
                name
            } else {
                format!("{rel}/{name}")
            };
            let file_type = entry.file_type().await.map_err(|e| io_error(&path, e))?;

            if file_type.is_dir() {
                if filter.excludes(&format!("{rel_path}/")) {
                    debug!(path = %rel_path, "Pruning excluded directory");
                    continue;
                }
                subdirs.push((path, rel_path));
            } else if file_type.is_file() {
                if !filter.accepts(&rel_path) {
                    debug!(path = %rel_path, "File filtered out");
                    continue;
                }
                let size = entry.metadata().await.map_err(|e| io_error(&path, e))?.len();
                if size > ceiling {
                    debug!(path = %rel_path, size, ceiling, "File exceeds size ceiling");
                    continue;
                }
                let bytes = tokio::fs::read(&path).await.map_err(|e| io_error(&path, e))?;
                inputs.push(IngestInput::file(rel_path, bytes));
            } else {
                debug!(path = %rel_path, "Skipping non-regular file");
            }
        }
        // Reversed so the stack pops directories in name order.
        stack.extend(subdirs.into_iter().rev());
    }
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> IngestError {
    IngestError::Io {
        path: path.to_path_buf(),
        source,
    }
}
