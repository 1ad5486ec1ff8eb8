// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! oj - Odd Jobs CLI
//!
//! A thin client over [`oj_daemon::Control`] (§6's control surface): it
//! opens the same on-disk WAL and snapshot `ojd` would (via
//! [`oj_daemon::recover`]), performs one operation, flushes the journal,
//! and exits. This is §6's single-process mode — there is no transport
//! between this binary and a running `ojd`, so don't point both at the
//! same state directory at once.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod color;
mod output;
mod table;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use oj_adapters::UnixProcessAdapter;
use oj_core::{ClassKey, JobId, Session};
use oj_daemon::{recover, Control, LoggingNotifier, SupervisorConfig};
use oj_runbook::source::SourcePrecedence;

use output::OutputFormat;
use table::{Column, Table};

#[derive(Parser)]
#[command(name = "oj", version, about = "Odd Jobs - an event-driven process supervisor")]
struct Cli {
    /// Operate against a per-user session instead of the system session.
    #[arg(long, global = true, value_name = "SESSION")]
    session: Option<String>,

    /// Render output as JSON instead of text tables.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an instance of a job class.
    Start {
        class: String,
        #[arg(long = "env", value_name = "KEY=VALUE")]
        env: Vec<String>,
    },
    /// Stop a running instance of a job class.
    Stop {
        class: String,
        /// Instance name, for classes with `instance` expansion. Omit for
        /// singleton classes.
        #[arg(long, default_value = "")]
        instance: String,
        #[arg(long = "env", value_name = "KEY=VALUE")]
        env: Vec<String>,
    },
    /// Stop then start an instance, atomically with respect to other
    /// control requests against it.
    Restart {
        class: String,
        #[arg(long, default_value = "")]
        instance: String,
        #[arg(long = "env", value_name = "KEY=VALUE")]
        env: Vec<String>,
    },
    /// List every known instance, or look one up by class and name.
    Status {
        class: Option<String>,
        #[arg(long, default_value = "")]
        instance: String,
    },
    /// Emit an event for the next dispatch pass.
    Emit {
        name: String,
        #[arg(long = "env", value_name = "KEY=VALUE")]
        env: Vec<String>,
    },
    /// Load job class definitions from a directory and install them.
    Conf {
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SupervisorConfig::load().context("loading supervisor configuration")?;
    if let Some(session) = &cli.session {
        config.session = Some(Session::new(session.clone()));
    }

    std::fs::create_dir_all(&config.state_dir).context("creating state directory")?;
    if let Some(parent) = config.wal_path.parent() {
        std::fs::create_dir_all(parent).context("creating WAL directory")?;
    }

    let control =
        recover(UnixProcessAdapter::new(), LoggingNotifier, oj_core::SystemClock::default(), &config)
            .await
            .context("recovering supervisor state")?;

    let session = config.session.clone();

    match cli.command {
        Commands::Start { class, env } => {
            let key = ClassKey::new(session, class);
            let env = oj_core::parse_env_all(&env).context("invalid --env entry")?;
            let job_id = control.start(&key, env).await?;
            let instance = control.get_instance(job_id).await.map(|job| job.name).unwrap_or_default();
            if instance.is_empty() {
                println!("started {key}");
            } else {
                println!("started {key} (instance {instance})");
            }
        }
        Commands::Stop { class, instance, env } => {
            let key = ClassKey::new(session, class);
            let env = oj_core::parse_env_all(&env).context("invalid --env entry")?;
            let job_id = resolve_instance(&control, &key, &instance).await?;
            control.stop(job_id, env).await?;
            println!("stopped {key}");
        }
        Commands::Restart { class, instance, env } => {
            let key = ClassKey::new(session, class);
            let env = oj_core::parse_env_all(&env).context("invalid --env entry")?;
            let job_id = resolve_instance(&control, &key, &instance).await?;
            control.restart(job_id, env).await?;
            println!("restarted {key}");
        }
        Commands::Status { class, instance } => {
            let rows = match class {
                Some(name) => {
                    let key = ClassKey::new(session, name);
                    match control.get_instance_by_name(&key, &instance).await {
                        Some(job) => vec![(key, job)],
                        None => Vec::new(),
                    }
                }
                None => control
                    .get_all_instances()
                    .await
                    .into_iter()
                    .map(|(_, job)| (job.class_key.clone(), job))
                    .collect(),
            };
            print_status(&rows, cli.output)?;
        }
        Commands::Emit { name, env } => {
            let env = oj_core::parse_env_all(&env).context("invalid --env entry")?;
            control.emit_event(name.clone(), env).await?;
            println!("emitted {name}");
        }
        Commands::Conf { dir } => {
            let classes = SourcePrecedence::new(vec![dir.clone()])
                .load_all()
                .with_context(|| format!("loading job classes from {}", dir.display()))?;
            let mut added = 0usize;
            let mut removed = 0usize;
            for class in classes {
                for event in control.install_class(class).await {
                    match event {
                        oj_engine::RegistryEvent::Added(_) => added += 1,
                        oj_engine::RegistryEvent::Removed(_) => removed += 1,
                    }
                }
            }
            println!("{added} class(es) added, {removed} superseded");
        }
    }

    control.wal().lock().flush().context("flushing event journal")?;
    Ok(())
}

/// Resolve a `(class, instance)` pair to a [`JobId`] through the control
/// surface, the only way a CLI caller can address an instance since
/// `JobId` has no stable textual form across process restarts.
async fn resolve_instance(control: &dyn Control, key: &ClassKey, instance: &str) -> Result<JobId> {
    control
        .get_all_instances()
        .await
        .into_iter()
        .find(|(_, job)| &job.class_key == key && job.name == instance)
        .map(|(id, _)| id)
        .ok_or_else(|| anyhow::anyhow!("no instance named {instance:?} of class {key}"))
}

fn print_status(rows: &[(ClassKey, oj_core::Job)], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = rows
                .iter()
                .map(|(key, job)| {
                    serde_json::json!({
                        "class": key.to_string(),
                        "instance": job.name,
                        "goal": format!("{:?}", job.goal).to_lowercase(),
                        "state": format!("{:?}", job.state).to_lowercase(),
                        "pid": job.pid_of(oj_core::ProcessKind::Main),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            let mut table = Table::new(vec![
                Column::left("CLASS"),
                Column::left("INSTANCE"),
                Column::left("GOAL"),
                Column::status("STATE"),
                Column::right("PID"),
            ]);
            for (key, job) in rows {
                let pid = job
                    .pid_of(oj_core::ProcessKind::Main)
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string());
                table.row(vec![
                    key.to_string(),
                    if job.name.is_empty() { "-".to_string() } else { job.name.clone() },
                    format!("{:?}", job.goal).to_lowercase(),
                    format!("{:?}", job.state).to_lowercase(),
                    pid,
                ]);
            }
            table.render(&mut std::io::stdout());
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
