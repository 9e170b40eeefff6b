//! Extension-based text/binary classification.

/// Placeholder content for files whose body is never extracted.
pub const NON_TEXT_SENTINEL: &str = "[Non-text file]";

/// Notebook extension; such files go through [`crate::notebook`] before insertion.
pub const NOTEBOOK_EXTENSION: &str = ".ipynb";

/// Extensions treated as text, including legacy mainframe sources
/// (COBOL programs and copybooks, JCL, IMS PSB/DBD definitions).
pub const TEXT_EXTENSIONS: &[&str] = &[
    ".md", ".txt", ".py", ".js", ".html", ".css", ".json", ".ipynb", ".ts", ".jsx", ".tsx",
    ".yaml", ".yml", ".sh", ".java", ".c", ".cpp", ".go", ".rs", ".cbl", ".dat", ".cpy", ".jcl",
    ".psb", ".dbd",
];

pub fn is_likely_text(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    TEXT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

pub fn is_notebook(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(NOTEBOOK_EXTENSION)
}
