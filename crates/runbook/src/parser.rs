// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job class file parsing (HCL, TOML, and JSON).

use crate::class_def::JobClassDef;
use crate::validate::validate_class;
use oj_core::JobClass;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Job class source file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Hcl,
    Json,
}

impl Format {
    /// Guess a format from a file extension (`.hcl`, `.toml`, `.json`).
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext {
            "hcl" => Some(Format::Hcl),
            "toml" => Some(Format::Toml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("HCL parse error: {0}")]
    Hcl(#[from] hcl::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid format for {location}: {message}")]
    InvalidFormat { location: String, message: String },
    #[error("reading {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: unrecognized job class file extension")]
    UnknownExtension { path: std::path::PathBuf },
}

/// A file's worth of `job "name" { ... }` definitions, map keyed by name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassFile {
    #[serde(default, alias = "job")]
    jobs: HashMap<String, JobClassDef>,
}

/// Parse every job class defined in `content`, tagging each with
/// `source_precedence` (the source's position in search order — higher
/// wins ties in [`crate::source::select_best`]).
pub fn parse_classes(
    content: &str,
    format: Format,
    source_precedence: i32,
) -> Result<Vec<JobClass>, ParseError> {
    let file: ClassFile = match format {
        Format::Toml => toml::from_str(content)?,
        Format::Hcl => hcl::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };

    let mut entries: Vec<(String, JobClassDef)> = file.jobs.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut classes = Vec::with_capacity(entries.len());
    for (name, def) in entries {
        let class = def.into_class(&name, source_precedence)?;
        validate_class(&class)?;
        classes.push(class);
    }
    Ok(classes)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
