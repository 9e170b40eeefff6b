//! Flattens the tree into a divider-delimited report and a single corpus.
//!
//! Unlike [`crate::render`], flattening walks children in insertion order.

use crate::tree::{DirectoryNode, Node};

const DIVIDER_WIDTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatFile {
    pub path: String,
    pub content: String,
}

/// Depth-first collection of every file within `ceiling` bytes that has
/// non-empty content.
pub fn collect_files(root: &DirectoryNode, ceiling: u64) -> Vec<FlatFile> {
    let mut results = Vec::new();
    collect_into(root, ceiling, &mut results);
    results
}

fn collect_into(dir: &DirectoryNode, ceiling: u64, results: &mut Vec<FlatFile>) {
    for child in &dir.children {
        match child {
            Node::File(file) => {
                let content = file.content.as_str();
                if file.size <= ceiling && !content.is_empty() {
                    results.push(FlatFile {
                        path: file.path.clone(),
                        content: content.to_string(),
                    });
                }
            }
            Node::Directory(sub) => collect_into(sub, ceiling, results),
        }
    }
}

pub fn files_report(files: &[FlatFile]) -> String {
    let divider = "=".repeat(DIVIDER_WIDTH);
    let mut out = String::new();
    for f in files {
        out.push_str(&format!(
            "{divider}\nFile: {}\n{divider}\n{}\n\n",
            f.path, f.content
        ));
    }
    out.trim().to_string()
}

/// The concatenated text every LLM feature is given.
pub fn corpus(files: &[FlatFile]) -> String {
    let mut out = String::new();
    for f in files {
        out.push_str(&format!("\n\n/********* {} *********/\n{}\n", f.path, f.content));
    }
    out.trim().to_string()
}
