//! Input source: the ordered list of identifiers to probe, plus the optional
//! in-place filtering pass that extracts addresses for one domain.

use crate::config::CaseFold;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input file not found: {0}")]
    Missing(PathBuf),
    #[error("input file {path} could not be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input contains no identifiers")]
    Empty,
    #[error("invalid filter pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Read identifiers from `path`, one per line, trimmed and case-folded per
/// policy. Empty lines are skipped; order and duplicates are preserved.
pub fn read_identifiers(path: &Path, fold: CaseFold) -> Result<Vec<String>, InputError> {
    if !path.exists() {
        return Err(InputError::Missing(path.to_path_buf()));
    }
    let data = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(data
        .lines()
        .map(|line| fold.apply(line))
        .filter(|id| !id.is_empty())
        .collect())
}

/// Result of an input filtering pass.
#[derive(Debug, Clone, Copy)]
pub struct FilterReport {
    /// Total pattern matches found in the file.
    pub found: usize,
    /// Unique addresses written back.
    pub unique: usize,
}

/// Extract every `user@<domain>` address from the file (case-insensitive),
/// dedupe preserving first occurrence, and rewrite the file with one address
/// per line. The rest of the file's content is discarded.
pub fn filter_file(path: &Path, domain: &str) -> Result<FilterReport, InputError> {
    if !path.exists() {
        return Err(InputError::Missing(path.to_path_buf()));
    }
    let data = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let pattern = format!(r"[a-zA-Z0-9._%+-]+@{}", regex::escape(domain));
    let re = regex::RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()?;

    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();
    let mut found = 0usize;
    for m in re.find_iter(&data) {
        found += 1;
        let addr = m.as_str().to_string();
        if seen.insert(addr.clone()) {
            unique.push(addr);
        }
    }

    if unique.is_empty() {
        return Err(InputError::Empty);
    }

    let mut out = unique.join("\n");
    out.push('\n');
    fs::write(path, out).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(FilterReport {
        found,
        unique: unique.len(),
    })
}
