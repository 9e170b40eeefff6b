//! Ingestion entry point: inputs → tree → statistics → listing, report, corpus.
//!
//! One call to [`Ingestor::ingest`] is one run. Every run builds a fresh tree
//! and returns an owned [`IngestionResult`]; nothing is kept between runs, so
//! a failed run cannot leave a stale corpus behind.
//!
//! # Error Handling
//! Per-entry problems (undecodable bytes, malformed notebooks) are recovered
//! locally and only change that entry's content. Paths nested deeper than
//! [`crate::tree::MAX_DEPTH`] are logged and skipped. Anything else aborts the run
//! with an [`IngestError`] and no partial result.

use crate::archive::{expand_archive, ArchiveError};
use crate::ceiling::{human_file_size, position_to_bytes, DEFAULT_POSITION};
use crate::classify::{is_likely_text, is_notebook};
use crate::flatten::{collect_files, corpus, files_report};
use crate::notebook::normalize_notebook;
use crate::pattern::{PatternFilter, PatternMode};
use crate::render::render_tree;
use crate::tree::{DirectoryNode, FileContent, TreeError, MAX_DEPTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No file provided.")]
    NoInput,
    #[error("failed to read input {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// User-facing knobs for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOptions {
    #[serde(default)]
    pub pattern_mode: PatternMode,
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Position on the size-ceiling scale, see [`crate::ceiling`].
    #[serde(default = "default_size_position")]
    pub size_position: u32,
}

fn default_size_position() -> u32 {
    DEFAULT_POSITION
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            pattern_mode: PatternMode::default(),
            patterns: Vec::new(),
            size_position: DEFAULT_POSITION,
        }
    }
}

impl IngestOptions {
    pub fn filter(&self) -> PatternFilter {
        PatternFilter::new(self.pattern_mode, &self.patterns)
    }

    pub fn ceiling(&self) -> u64 {
        position_to_bytes(self.size_position)
    }
}

/// How an input is fed into the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Inserted as a single file; its name may contain `/`.
    File,
    /// Expanded entry by entry, see [`crate::archive`].
    Archive,
}

/// One submitted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestInput {
    pub name: String,
    pub bytes: Vec<u8>,
    pub kind: InputKind,
}

impl IngestInput {
    /// Infers the kind from the name: a `.zip` suffix means archive.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let kind = if name.to_lowercase().ends_with(".zip") {
            InputKind::Archive
        } else {
            InputKind::File
        };
        Self {
            name,
            bytes: bytes.into(),
            kind,
        }
    }

    /// Always a loose file, whatever the name.
    pub fn file(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            kind: InputKind::File,
        }
    }

    pub fn is_archive(&self) -> bool {
        self.kind == InputKind::Archive
    }
}

/// Everything a run produces. The `corpus` is what LLM features consume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionResult {
    pub summary: String,
    pub directory: String,
    pub files_report: String,
    pub corpus: String,
    pub file_count: u64,
    pub total_size: u64,
}

impl IngestionResult {
    /// Summary, listing and report joined by blank lines.
    pub fn all_views(&self) -> String {
        [
            self.summary.trim(),
            self.directory.trim(),
            self.files_report.trim(),
        ]
        .join("\n\n")
    }
}

pub struct Ingestor {
    options: IngestOptions,
}

impl Ingestor {
    pub fn new(options: IngestOptions) -> Self {
        Self { options }
    }

    pub fn ingest(&self, inputs: Vec<IngestInput>) -> Result<IngestionResult, IngestError> {
        if inputs.is_empty() {
            error!("Ingestion requested without any input");
            return Err(IngestError::NoInput);
        }

        let filter = self.options.filter();
        // Computed once: insertion and flattening must agree on it.
        let ceiling = self.options.ceiling();
        info!(
            inputs = inputs.len(),
            ceiling,
            mode = ?self.options.pattern_mode,
            "Starting ingestion"
        );

        let mut root = DirectoryNode::root();
        for input in inputs {
            if input.is_archive() {
                expand_archive(&input.name, &input.bytes, &mut root, &filter, ceiling)?;
            } else {
                insert_loose_file(&mut root, input, &filter, ceiling)?;
            }
        }

        let stats = root.aggregate();
        let summary = format!(
            "Total files ingested: {}\nTotal size: {}\n",
            stats.file_count,
            human_file_size(stats.size)
        );
        let directory = render_tree(&root);
        let files = collect_files(&root, ceiling);

        info!(
            files = stats.file_count,
            directories = stats.dir_count,
            size = stats.size,
            extracted = files.len(),
            "Ingestion complete"
        );
        Ok(IngestionResult {
            summary,
            directory,
            files_report: files_report(&files),
            corpus: corpus(&files),
            file_count: stats.file_count,
            total_size: stats.size,
        })
    }
}

fn insert_loose_file(
    root: &mut DirectoryNode,
    input: IngestInput,
    filter: &PatternFilter,
    ceiling: u64,
) -> Result<(), IngestError> {
    if !filter.accepts(&input.name) {
        debug!(path = %input.name, "File filtered out");
        return Ok(());
    }
    let size = input.bytes.len() as u64;
    if size > ceiling {
        debug!(path = %input.name, size, ceiling, "File exceeds size ceiling");
        return Ok(());
    }

    let content = if is_likely_text(&input.name) {
        text_content(&input.name, String::from_utf8(input.bytes).ok())
    } else {
        FileContent::NonText
    };

    skip_too_deep(root.insert_file(&input.name, size, content))?;
    Ok(())
}

/// Returns `Ok(true)` when the tree rejected the path as too deep. That path
/// is logged and dropped; any other tree error still fails the run.
pub(crate) fn skip_too_deep<T>(inserted: Result<T, TreeError>) -> Result<bool, TreeError> {
    match inserted {
        Ok(_) => Ok(false),
        Err(TreeError::TooDeep { path }) => {
            warn!(path = %path, max_depth = MAX_DEPTH, "Path nested too deep, skipping it");
            Ok(true)
        }
        Err(e) => Err(e),
    }
}

/// Content for a text-classified file from its decoded body. Notebooks are
/// normalised. An empty body stays empty text, so flattening leaves it out;
/// an undecodable one becomes [`FileContent::NonText`].
pub(crate) fn text_content(path: &str, decoded: Option<String>) -> FileContent {
    match decoded {
        Some(text) if text.is_empty() => FileContent::Text(text),
        Some(text) if is_notebook(path) => FileContent::Text(normalize_notebook(&text, path)),
        Some(text) => FileContent::Text(text),
        None => {
            warn!(path, "Could not decode file, keeping it as non-text");
            FileContent::NonText
        }
    }
}
