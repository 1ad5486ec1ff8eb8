// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Overlap resolution across job class configuration sources.
//!
//! A deployment can hand the registry job classes assembled from more than
//! one directory (vendor-shipped defaults, site overrides, per-user
//! overrides). [`SourcePrecedence`] fixes the search order once, up front,
//! and stamps every [`JobClass`] it loads with the numeric precedence of the
//! directory it came from, so the registry can resolve a same-name conflict
//! with a plain integer comparison instead of re-consulting the filesystem.

use crate::parser::{parse_classes, Format, ParseError};
use oj_core::JobClass;
use std::fs;
use std::path::{Path, PathBuf};

/// An ordered list of directories to search for job class files, highest
/// precedence first.
#[derive(Debug, Clone)]
pub struct SourcePrecedence {
    dirs: Vec<PathBuf>,
}

impl SourcePrecedence {
    /// Build from directories in highest-to-lowest precedence order.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Numeric precedence of `dirs[index]`; earlier entries rank higher so
    /// that [`select_best`] can compare with plain `>`.
    fn rank(&self, index: usize) -> i32 {
        (self.dirs.len() - index) as i32
    }

    /// Load and parse every recognized job class file under each directory,
    /// stamping each resulting [`JobClass`] with its source's precedence.
    /// Missing directories are skipped rather than treated as errors, since
    /// not every deployment populates every tier.
    pub fn load_all(&self) -> Result<Vec<JobClass>, ParseError> {
        let mut classes = Vec::new();
        for (index, dir) in self.dirs.iter().enumerate() {
            if !dir.is_dir() {
                continue;
            }
            let precedence = self.rank(index);
            for entry in read_dir_sorted(dir)? {
                let Some(format) = entry
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(Format::from_extension)
                else {
                    continue;
                };
                let content = fs::read_to_string(&entry).map_err(|source| ParseError::Io {
                    path: entry.clone(),
                    source,
                })?;
                classes.extend(parse_classes(&content, format, precedence)?);
            }
        }
        Ok(classes)
    }
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, ParseError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|source| ParseError::Io {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Is `candidate` strictly better than `incumbent`? Ties go to the
/// incumbent: a same-precedence replacement never wins, matching the
/// registry's "keep exactly one, don't thrash on ties" rule.
pub fn is_strictly_better(candidate: &JobClass, incumbent: &JobClass) -> bool {
    candidate.source_precedence > incumbent.source_precedence
}

/// Pick the best candidate for a `(name, session)` slot among sources
/// declared in precedence order. Returns `None` for an empty input.
pub fn select_best(candidates: impl IntoIterator<Item = JobClass>) -> Option<JobClass> {
    candidates
        .into_iter()
        .max_by_key(|class| class.source_precedence)
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
