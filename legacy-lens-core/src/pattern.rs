//! Ignore/include pattern matching for ingested paths.
//!
//! The matcher is intentionally minimal: it understands three pattern shapes
//! (`*.ext`, `prefix/*`, and plain substrings) and compares case-insensitively.
//! There is no `**` and there are no character classes.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

/// Patterns that are always active unless an include rule removes them.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "*.pyc",
    "__pycache__",
    ".git",
    ".github",
    ".venv",
    "env",
    "venv",
    "node_modules",
    "bower_components",
    "*.class",
    "*.jar",
    "*.png",
    "*.jpg",
    "*.jpeg",
    "*.gif",
    "*.ico",
    "*.pdf",
    "*.mp4",
    "*.mp3",
    "dist",
    "build",
];

/// How user supplied patterns are combined with the default ignore set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternMode {
    /// User patterns are added to the ignore set.
    #[default]
    Exclude,
    /// Only paths matching a user pattern are kept.
    Include,
}

/// Strips leading slashes and turns a trailing `/` into `/*`.
pub fn normalize_pattern(pattern: &str) -> String {
    let mut p = pattern.trim_start_matches('/').to_string();
    if p.ends_with('/') {
        p.push('*');
    }
    p
}

/// Splits a free-text pattern list on whitespace and commas.
pub fn split_patterns(raw: &str) -> Vec<String> {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    let separator = SEPARATOR.get_or_init(|| Regex::new(r"[\s,]+").expect("valid separator regex"));
    separator
        .split(raw.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case-insensitive match of `path` against a single pattern.
pub fn matches(path: &str, pattern: &str) -> bool {
    let path = path.to_lowercase();
    let pattern = pattern.to_lowercase();
    if let Some(ext) = pattern.strip_prefix('*') {
        if ext.starts_with('.') {
            return path.ends_with(ext);
        }
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        if prefix.ends_with('/') {
            return path.starts_with(prefix);
        }
    }
    path.contains(&pattern)
}

pub fn should_exclude<S: AsRef<str>>(path: &str, ignore_patterns: &[S]) -> bool {
    ignore_patterns.iter().any(|p| matches(path, p.as_ref()))
}

pub fn should_include<S: AsRef<str>>(path: &str, include_patterns: &[S]) -> bool {
    include_patterns.iter().any(|p| matches(path, p.as_ref()))
}

/// The effective ignore and include sets for one ingestion run.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    ignore: Vec<String>,
    include: Option<Vec<String>>,
}

impl PatternFilter {
    /// Combines the default ignore set with the user's patterns.
    ///
    /// In [`PatternMode::Include`] the user patterns become the include set and
    /// are pruned from the default ignore set, so `--include dist/` can pull a
    /// normally ignored directory back in. An empty user list leaves the
    /// defaults untouched in either mode.
    pub fn new<S: AsRef<str>>(mode: PatternMode, user_patterns: &[S]) -> Self {
        let mut user: Vec<String> = Vec::new();
        for p in user_patterns {
            let normalized = normalize_pattern(p.as_ref());
            if !normalized.is_empty() && !user.contains(&normalized) {
                user.push(normalized);
            }
        }

        let mut ignore: Vec<String> = DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect();
        let mut include = None;

        if !user.is_empty() {
            match mode {
                PatternMode::Include => {
                    ignore.retain(|p| !user.contains(p));
                    include = Some(user);
                }
                PatternMode::Exclude => {
                    for p in user {
                        if !ignore.contains(&p) {
                            ignore.push(p);
                        }
                    }
                }
            }
        }

        debug!(
            ?mode,
            ignore_count = ignore.len(),
            include_count = include.as_ref().map(Vec::len).unwrap_or(0),
            "Built pattern filter"
        );
        Self { ignore, include }
    }

    pub fn ignore_patterns(&self) -> &[String] {
        &self.ignore
    }

    pub fn include_patterns(&self) -> Option<&[String]> {
        self.include.as_deref()
    }

    pub fn excludes(&self, path: &str) -> bool {
        should_exclude(path, &self.ignore)
    }

    /// A path is accepted iff it is not excluded and, when an include set is
    /// configured, it matches that set.
    pub fn accepts(&self, path: &str) -> bool {
        if self.excludes(path) {
            return false;
        }
        match &self.include {
            Some(include) => should_include(path, include),
            None => true,
        }
    }
}

impl Default for PatternFilter {
    fn default() -> Self {
        Self::new::<&str>(PatternMode::Exclude, &[])
    }
}
