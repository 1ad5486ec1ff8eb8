// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Odd Jobs Daemon (ojd)
//!
//! §5's supervisor process: owns the job registry, the dispatch loop, and
//! the durable event journal. A future transport would drive it through
//! [`oj_daemon::Control`]; for now `oj` (the CLI) embeds that trait
//! in-process per §6's single-process mode, so this binary's only job is
//! to hold the engine open and keep it checkpointed.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::sync::Arc;

use fs2::FileExt;
use oj_adapters::UnixProcessAdapter;
use oj_core::SystemClock;
use oj_daemon::{recover, LoggingNotifier, Supervisor, SupervisorConfig};
use tokio::sync::Notify;
use tracing::info;

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: u32 = 3;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("ojd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("ojd {}", env!("CARGO_PKG_VERSION"));
                println!("Odd Jobs Daemon - event-driven process supervisor");
                println!();
                println!("USAGE:");
                println!("    ojd");
                println!();
                println!("Typically started by the `oj` CLI rather than invoked directly.");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: ojd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = SupervisorConfig::load()?;
    std::fs::create_dir_all(&config.state_dir)?;
    if let Some(parent) = config.wal_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    rotate_log_if_needed(&config.log_path);
    write_startup_marker(&config)?;
    let _log_guard = setup_logging(&config)?;

    info!("starting supervisor");

    let lock_file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(&config.lock_path)?;
    if lock_file.try_lock_exclusive().is_err() {
        eprintln!("ojd is already running (lock held at {})", config.lock_path.display());
        std::process::exit(1);
    }
    use std::io::Write as _;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let _lock_file = lock_file;

    let control = recover(UnixProcessAdapter::new(), LoggingNotifier, SystemClock::default(), &config).await?;
    let supervisor = Supervisor::new(control, &config);
    let shutdown = Arc::new(Notify::new());

    println!("READY");
    supervisor.run(shutdown).await?;

    info!("supervisor stopped");
    Ok(())
}

fn write_startup_marker(config: &SupervisorConfig) -> std::io::Result<()> {
    use std::io::Write;
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(&config.log_path)?;
    writeln!(file, "--- ojd: starting (pid: {}) ---\n", std::process::id())
}

fn setup_logging(config: &SupervisorConfig) -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let parent = config.log_path.parent().unwrap_or_else(|| std::path::Path::new("."));
    std::fs::create_dir_all(parent)?;
    let file_name = config.log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("daemon.log"));
    let file_appender = tracing_appender::rolling::never(parent, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    Ok(guard)
}

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`]. Best-effort:
/// failures are silently ignored so the daemon still starts.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}
