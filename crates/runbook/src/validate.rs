// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Non-fatal and fatal lints applied to a parsed [`JobClass`].

use crate::parser::ParseError;
use oj_core::{JobClass, ProcessKind};

/// Validate a single job class. Fatal checks return `Err`; everything else
/// is logged as a non-fatal lint.
pub(crate) fn validate_class(class: &JobClass) -> Result<(), ParseError> {
    for kind in ProcessKind::ALL {
        if let Some(def) = class.process(kind) {
            let location = format!("job.{}.{}", class.key.name, kind.as_str());
            validate_command_syntax(&def.command, &location)?;
        }
    }

    if class.processes.get(&ProcessKind::Main).is_none() && !class.emits.is_empty() {
        tracing::warn!(
            job = %class.key.name,
            "declares 'emits' but has no main process; emitted events will never be observed \
             unless pre_start/post_start produce them"
        );
    }

    Ok(())
}

/// Reject commands that couldn't possibly exec: empty, or containing a NUL
/// byte (which truncates silently in argv construction downstream).
fn validate_command_syntax(command: &str, location: &str) -> Result<(), ParseError> {
    if command.trim().is_empty() {
        return Err(ParseError::InvalidFormat {
            location: location.to_string(),
            message: "command must not be empty".to_string(),
        });
    }
    if command.contains('\0') {
        return Err(ParseError::InvalidFormat {
            location: location.to_string(),
            message: "command must not contain a NUL byte".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
