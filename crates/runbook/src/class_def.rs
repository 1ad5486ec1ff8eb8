// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk representation of a job class, and its conversion into
//! [`oj_core::JobClass`].

use crate::expr;
use crate::parser::ParseError;
use oj_core::{
    class::libc_signal, parse_env_all, ClassKey, ConsoleMode, Expect, JobClass, ProcessDef,
    ProcessKind, ResourceKind, ResourceLimits, RespawnPolicy, Session,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Either a bare command line or an explicit script body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessStanza {
    Command(String),
    Script { script: String },
}

impl ProcessStanza {
    fn into_def(self) -> ProcessDef {
        match self {
            ProcessStanza::Command(command) => ProcessDef::command(command),
            ProcessStanza::Script { script } => ProcessDef::script(script),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RespawnStanza {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub interval: Option<u64>,
}

/// Raw, directly-deserializable shape of a `job "name" { ... }` block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobClassDef {
    pub session: Option<String>,
    pub instance: Option<String>,
    pub env: Vec<String>,
    pub start_on: Option<String>,
    pub stop_on: Option<String>,
    pub emits: Vec<String>,
    pub pre_start: Option<ProcessStanza>,
    pub main: Option<ProcessStanza>,
    pub post_start: Option<ProcessStanza>,
    pub pre_stop: Option<ProcessStanza>,
    pub post_stop: Option<ProcessStanza>,
    pub respawn: RespawnStanza,
    pub normalexit: Vec<i32>,
    pub kill_timeout: Option<u64>,
    pub kill_signal: Option<String>,
    pub console: Option<String>,
    pub limits: BTreeMap<String, (u64, u64)>,
    pub umask: Option<String>,
    pub nice: Option<i32>,
    pub working_directory: Option<PathBuf>,
    pub chroot: Option<PathBuf>,
    pub expect: Option<String>,
}

fn parse_signal(name: &str, location: &str) -> Result<i32, ParseError> {
    match name.to_ascii_uppercase().as_str() {
        "SIGTERM" => Ok(libc_signal::SIGTERM),
        "SIGKILL" => Ok(libc_signal::SIGKILL),
        "SIGSTOP" => Ok(libc_signal::SIGSTOP),
        "SIGCONT" => Ok(libc_signal::SIGCONT),
        other => other.parse().map_err(|_| ParseError::InvalidFormat {
            location: location.to_string(),
            message: format!("unknown kill_signal '{other}'"),
        }),
    }
}

fn parse_console(name: &str, location: &str) -> Result<ConsoleMode, ParseError> {
    match name {
        "none" => Ok(ConsoleMode::None),
        "log" => Ok(ConsoleMode::Log),
        "owner" => Ok(ConsoleMode::Owner),
        other => Err(ParseError::InvalidFormat {
            location: location.to_string(),
            message: format!("unknown console mode '{other}'; expected none, log, or owner"),
        }),
    }
}

fn parse_expect(name: &str, location: &str) -> Result<Expect, ParseError> {
    match name {
        "fork" => Ok(Expect::Fork),
        "daemon" => Ok(Expect::Daemon),
        "stop" => Ok(Expect::Stop),
        other => Err(ParseError::InvalidFormat {
            location: location.to_string(),
            message: format!("unknown expect mode '{other}'; expected fork, daemon, or stop"),
        }),
    }
}

fn parse_resource_kind(name: &str, location: &str) -> Result<ResourceKind, ParseError> {
    match name {
        "cpu" => Ok(ResourceKind::Cpu),
        "fsize" => Ok(ResourceKind::Fsize),
        "data" => Ok(ResourceKind::Data),
        "stack" => Ok(ResourceKind::Stack),
        "core" => Ok(ResourceKind::Core),
        "rss" => Ok(ResourceKind::Rss),
        "nofile" => Ok(ResourceKind::Nofile),
        "as" => Ok(ResourceKind::As),
        "nproc" => Ok(ResourceKind::Nproc),
        "memlock" => Ok(ResourceKind::Memlock),
        "locks" => Ok(ResourceKind::Locks),
        "sigpending" => Ok(ResourceKind::Sigpending),
        "msgqueue" => Ok(ResourceKind::Msgqueue),
        "nice" => Ok(ResourceKind::Nice),
        "rtprio" => Ok(ResourceKind::Rtprio),
        other => Err(ParseError::InvalidFormat {
            location: location.to_string(),
            message: format!("unknown resource limit name '{other}'"),
        }),
    }
}

impl JobClassDef {
    /// Convert into a fully-formed [`JobClass`], assigning `source_precedence`
    /// as recorded by the caller (the source's position in search order).
    pub fn into_class(
        self,
        name: &str,
        source_precedence: i32,
    ) -> Result<JobClass, ParseError> {
        let key = ClassKey::new(self.session.map(Session::new), name.to_string());
        let mut class = JobClass::new(key);
        class.instance = self.instance.unwrap_or_default();
        class.env = parse_env_all(&self.env).map_err(|e| ParseError::InvalidFormat {
            location: format!("job.{name}.env"),
            message: e.to_string(),
        })?;
        class.emits = self.emits;
        class.normalexit = self.normalexit;
        class.source_precedence = source_precedence;

        if let Some(expr) = &self.start_on {
            class.start_on = expr::parse(expr).map_err(|e| ParseError::InvalidFormat {
                location: format!("job.{name}.start_on"),
                message: e.to_string(),
            })?;
        }
        if let Some(expr) = &self.stop_on {
            class.stop_on = expr::parse(expr).map_err(|e| ParseError::InvalidFormat {
                location: format!("job.{name}.stop_on"),
                message: e.to_string(),
            })?;
        }

        for (kind, stanza) in [
            (ProcessKind::PreStart, self.pre_start),
            (ProcessKind::Main, self.main),
            (ProcessKind::PostStart, self.post_start),
            (ProcessKind::PreStop, self.pre_stop),
            (ProcessKind::PostStop, self.post_stop),
        ] {
            if let Some(stanza) = stanza {
                class.processes.insert(kind, stanza.into_def());
            }
        }

        class.respawn = RespawnPolicy {
            enabled: self.respawn.enabled,
            limit: self.respawn.limit.unwrap_or(10),
            interval: Duration::from_secs(self.respawn.interval.unwrap_or(5)),
        };

        if let Some(secs) = self.kill_timeout {
            class.kill_timeout = Duration::from_secs(secs);
        }
        if let Some(sig) = &self.kill_signal {
            class.kill_signal = parse_signal(sig, &format!("job.{name}.kill_signal"))?;
        }
        if let Some(mode) = &self.console {
            class.console = parse_console(mode, &format!("job.{name}.console"))?;
        }
        if let Some(mode) = &self.expect {
            class.expect = parse_expect(mode, &format!("job.{name}.expect"))?;
        }
        if let Some(mask) = &self.umask {
            class.umask = u32::from_str_radix(mask, 8).map_err(|_| ParseError::InvalidFormat {
                location: format!("job.{name}.umask"),
                message: format!("'{mask}' is not a valid octal umask"),
            })?;
        }
        class.nice = self.nice;
        class.working_directory = self.working_directory;
        class.chroot = self.chroot;

        let mut limits = ResourceLimits::default();
        for (resource, bounds) in self.limits {
            let kind = parse_resource_kind(&resource, &format!("job.{name}.limits.{resource}"))?;
            limits.limits.insert(kind, bounds);
        }
        class.limits = limits;

        Ok(class)
    }
}

#[cfg(test)]
#[path = "class_def_tests.rs"]
mod tests;
