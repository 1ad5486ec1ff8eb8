// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance-name template expansion and spawn-time environment
//! construction, per §4.4/§4.7's `$VAR`-reference and env-layering rules.

use crate::EngineError;
use oj_core::{merge_env, CoreError, EnvVar, Job, JobClass};

/// Construct an `EnvVar` from a hardcoded-valid key, converting the
/// (practically unreachable) validation failure through [`EngineError`].
/// Shared by every call site that builds a synthetic env entry, since
/// `clippy::expect_used` forbids asserting it away instead.
pub(crate) fn env_var(key: &str, value: impl Into<String>) -> Result<EnvVar, EngineError> {
    EnvVar::new(key, value).map_err(CoreError::from).map_err(EngineError::from)
}

/// Expand a `class.instance` template (possibly containing `$VAR`
/// references) against the aggregated match environment. An empty template
/// expands to the empty string (the singleton instance name).
pub fn expand_instance_name(template: &str, env: &[EnvVar]) -> Result<String, EngineError> {
    let mut result = String::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }
        let mut var = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                var.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if var.is_empty() {
            result.push('$');
            continue;
        }
        let value = env
            .iter()
            .find(|e| e.key() == var)
            .map(|e| e.value())
            .ok_or_else(|| EngineError::UndefinedVariable(var.clone()))?;
        result.push_str(value);
    }
    Ok(result)
}

/// Build the final environment handed to a spawned child: built-ins first,
/// then class defaults, then the instance's committed environment (which
/// already carries the event-matched overlay and any `UPSTART_EVENTS`/
/// `UPSTART_STOP_EVENTS` key from the dispatch pass), finally the two
/// per-job synthetic identifiers. Each layer's keys override the previous
/// layer's on conflict — last write wins.
pub fn build_spawn_env(
    class: &JobClass,
    job: &Job,
    inherited_path: &str,
    inherited_term: &str,
) -> Result<Vec<EnvVar>, EngineError> {
    let mut env = vec![env_var("PATH", inherited_path)?, env_var("TERM", inherited_term)?];
    env = merge_env(&env, &class.env);
    env = merge_env(&env, &job.env);
    let synthetic = vec![
        env_var("UPSTART_JOB", class.key.name.clone())?,
        env_var("UPSTART_INSTANCE", job.name.clone())?,
    ];
    Ok(merge_env(&env, &synthetic))
}

#[cfg(test)]
#[path = "envbuild_tests.rs"]
mod tests;
