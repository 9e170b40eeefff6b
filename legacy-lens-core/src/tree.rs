//! In-memory file tree built during one ingestion run.
//!
//! The root is a [`DirectoryNode`] with path `/`. Directories own their
//! children outright; there are no parent pointers. Directory statistics are
//! derived state filled in by [`DirectoryNode::aggregate`].

use crate::classify::NON_TEXT_SENTINEL;
use thiserror::Error;
use tracing::debug;

/// Deepest path (in segments) the tree accepts. Every recursive walk over the
/// tree is bounded by this.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("path {path:?} has no file name")]
    EmptyFileName { path: String },
    #[error("path {path:?} exceeds the maximum depth of {MAX_DEPTH} segments")]
    TooDeep { path: String },
    #[error("tree invariant violated: expected directory {segment:?}")]
    NotADirectory { segment: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Directory(DirectoryNode),
    File(FileNode),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Directory(d) => &d.name,
            Node::File(f) => &f.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Node::Directory(d) => &d.path,
            Node::File(f) => &f.path,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }
}

/// Aggregated subtree statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryStats {
    pub file_count: u64,
    pub dir_count: u64,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    pub name: String,
    pub path: String,
    pub children: Vec<Node>,
    pub stats: DirectoryStats,
}

/// Extracted body of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    /// Binary, undecodable or empty; rendered as [`NON_TEXT_SENTINEL`].
    NonText,
}

impl FileContent {
    pub fn as_str(&self) -> &str {
        match self {
            FileContent::Text(s) => s,
            FileContent::NonText => NON_TEXT_SENTINEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub content: FileContent,
}

fn join_path(parent: &str, name: &str) -> String {
    format!("{}/{}", parent.trim_end_matches('/'), name)
}

impl DirectoryNode {
    pub fn root() -> Self {
        Self::new("", "/".to_string())
    }

    fn new(name: &str, path: String) -> Self {
        Self {
            name: name.to_string(),
            path,
            children: Vec::new(),
            stats: DirectoryStats::default(),
        }
    }

    fn depth(&self) -> usize {
        self.path.split('/').filter(|s| !s.is_empty()).count()
    }

    /// Walks `segments` from this directory, creating missing directories and
    /// reusing existing ones. Empty segments are skipped.
    pub fn ensure_path<I, S>(&mut self, segments: I) -> Result<&mut DirectoryNode, TreeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<S> = segments
            .into_iter()
            .filter(|s| !s.as_ref().is_empty())
            .collect();
        // Checked up front so a rejected path leaves no partial directories.
        if self.depth() + segments.len() > MAX_DEPTH {
            let mut path = self.path.trim_end_matches('/').to_string();
            for segment in &segments {
                path.push('/');
                path.push_str(segment.as_ref());
            }
            return Err(TreeError::TooDeep { path });
        }

        let mut current = self;
        for segment in &segments {
            let segment = segment.as_ref();
            let index = match current
                .children
                .iter()
                .position(|c| matches!(c, Node::Directory(d) if d.name == segment))
            {
                Some(index) => index,
                None => {
                    let path = join_path(&current.path, segment);
                    debug!(path = %path, "Creating directory node");
                    current
                        .children
                        .push(Node::Directory(DirectoryNode::new(segment, path)));
                    current.children.len() - 1
                }
            };
            current = match current.children.get_mut(index) {
                Some(Node::Directory(dir)) => dir,
                _ => {
                    return Err(TreeError::NotADirectory {
                        segment: segment.to_string(),
                    })
                }
            };
        }
        Ok(current)
    }

    /// Inserts a file at `full_path` (split on `/`), creating parent
    /// directories as needed. A file with the same name already present in
    /// the target directory is kept and the new one is dropped.
    pub fn insert_file(
        &mut self,
        full_path: &str,
        size: u64,
        content: FileContent,
    ) -> Result<(), TreeError> {
        let mut segments: Vec<&str> = full_path.split('/').filter(|s| !s.is_empty()).collect();
        let Some(file_name) = segments.pop() else {
            return Err(TreeError::EmptyFileName {
                path: full_path.to_string(),
            });
        };
        if segments.len() + 1 > MAX_DEPTH {
            return Err(TreeError::TooDeep {
                path: full_path.to_string(),
            });
        }

        let parent = self.ensure_path(segments)?;
        let exists = parent
            .children
            .iter()
            .any(|c| matches!(c, Node::File(f) if f.name == file_name));
        if exists {
            debug!(path = full_path, "File already present, keeping first insertion");
            return Ok(());
        }

        let path = join_path(&parent.path, file_name);
        debug!(path = %path, size, "Inserting file node");
        parent.children.push(Node::File(FileNode {
            name: file_name.to_string(),
            path,
            size,
            content,
        }));
        Ok(())
    }

    /// Post-order pass computing `file_count`, `dir_count` and `size` for
    /// every directory in the subtree. Running it twice gives the same result.
    pub fn aggregate(&mut self) -> DirectoryStats {
        let mut stats = DirectoryStats::default();
        for child in &mut self.children {
            match child {
                Node::Directory(dir) => {
                    let child_stats = dir.aggregate();
                    stats.file_count += child_stats.file_count;
                    stats.dir_count += 1 + child_stats.dir_count;
                    stats.size += child_stats.size;
                }
                Node::File(file) => {
                    stats.file_count += 1;
                    stats.size += file.size;
                }
            }
        }
        self.stats = stats;
        stats
    }
}
