// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL journal of dispatched [`Event`]s, written ahead of processing so a
//! crashed or re-exec'd supervisor can recover the pending portion of the
//! event stream instead of losing it.
//!
//! Every event the dispatch loop is about to act on is appended here first;
//! only once the append is durable does the caller let that event reach
//! `oj_engine::Dispatcher::emit`. Recovery replays everything after the last
//! checkpointed sequence back through the ordinary dispatch loop — this
//! crate does not re-derive state itself, it only hands the raw events back.
//!
//! Each line is one record: `{"seq":N,"event":{...}}\n`. Writes are
//! buffered and flushed together (group commit, ~10ms windows) so a burst
//! of events from a single dispatch pass costs one `fsync`, not one per
//! event.

use oj_core::Event;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::warn;

/// Group-commit window: buffered entries are held at most this long before
/// a flush is due.
const FLUSH_INTERVAL: Duration = Duration::from_millis(10);

/// Buffered entries beyond this count force a flush regardless of how long
/// the window has been open, so a respawn storm can't grow the in-memory
/// buffer without bound.
const FLUSH_THRESHOLD: usize = 100;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt entry at offset {offset}: {message}")]
    Corrupt { offset: u64, message: String },
}

#[derive(Serialize)]
struct RecordRef<'a> {
    seq: u64,
    event: &'a Event,
}

#[derive(Deserialize)]
struct Record {
    seq: u64,
    event: Event,
}

/// A journal entry with the sequence number assigned when it was appended.
#[derive(Debug, Clone)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

/// Outcome of scanning the journal file from the start: the highest
/// sequence seen, the byte offset of the first entry past `processed_seq`
/// (or end-of-file if none), every entry parsed along the way, and whether
/// a parse failure was hit before EOF.
struct ScanResult {
    max_seq: u64,
    unprocessed_offset: u64,
    lines: Vec<String>,
    corrupt: bool,
}

/// Durable, append-only journal of dispatched events with group commit.
///
/// Tracks two cursors: `write_seq` (the highest sequence number assigned so
/// far) and `processed_seq` (the highest sequence the dispatch loop has
/// finished acting on — persisted via snapshots, not the journal itself).
pub struct Wal {
    file: File,
    /// Separate handle for `next_unprocessed`'s sequential reads, so the
    /// write cursor on `file` (always at EOF, append mode) is undisturbed.
    read_file: File,
    path: PathBuf,
    write_seq: u64,
    processed_seq: u64,
    write_buffer: Vec<Vec<u8>>,
    last_flush: Instant,
    read_offset: u64,
}

impl Wal {
    /// Open or create the journal at `path`. `processed_seq` comes from the
    /// last loaded snapshot (0 if there isn't one yet); it only seeds where
    /// `next_unprocessed` starts reading, the on-disk file is untouched by
    /// this value alone.
    pub fn open(path: &Path, processed_seq: u64) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = Self::open_append(path)?;
        let mut scan = Self::scan(&file, processed_seq)?;

        if scan.corrupt {
            drop(file);
            let bak_path = crate::snapshot::rotate_bak_path(path);
            warn!(
                path = %path.display(),
                bak = %bak_path.display(),
                valid_entries = scan.lines.len(),
                "corrupt event journal, rotating to .bak and keeping the valid prefix",
            );
            std::fs::rename(path, &bak_path)?;

            {
                let mut clean = File::create(path)?;
                for line in &scan.lines {
                    clean.write_all(line.as_bytes())?;
                    clean.write_all(b"\n")?;
                }
                clean.sync_all()?;
            }

            file = Self::open_append(path)?;
            scan = Self::scan(&file, processed_seq)?;
        }

        let read_file = file.try_clone()?;
        Ok(Self {
            file,
            read_file,
            path: path.to_owned(),
            write_seq: scan.max_seq,
            processed_seq,
            write_buffer: Vec::new(),
            last_flush: Instant::now(),
            read_offset: scan.unprocessed_offset,
        })
    }

    fn open_append(path: &Path) -> Result<File, WalError> {
        OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(WalError::from)
    }

    /// One sequential pass over the file: collects every parseable line
    /// (for corruption recovery), the max sequence seen, and the offset of
    /// the first entry past `processed_seq`. A parse failure stops the scan
    /// and sets `corrupt`; everything already collected is still returned
    /// as the valid prefix.
    fn scan(file: &File, processed_seq: u64) -> Result<ScanResult, WalError> {
        let mut reader = BufReader::new(file.try_clone()?);
        reader.seek(SeekFrom::Start(0))?;

        let mut result = ScanResult { max_seq: 0, unprocessed_offset: 0, lines: Vec::new(), corrupt: false };
        let mut offset = 0u64;
        let mut line = String::new();
        let mut found_unprocessed = false;

        loop {
            line.clear();
            let read = match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    result.corrupt = true;
                    break;
                }
                Err(e) => return Err(e.into()),
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                offset += read as u64;
                continue;
            }

            let record: Record = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(_) => {
                    result.corrupt = true;
                    break;
                }
            };

            result.max_seq = result.max_seq.max(record.seq);
            if record.seq > processed_seq && !found_unprocessed {
                result.unprocessed_offset = offset;
                found_unprocessed = true;
            }
            result.lines.push(trimmed.to_string());
            offset += read as u64;
        }

        if !found_unprocessed {
            result.unprocessed_offset = offset;
        }
        Ok(result)
    }

    /// Buffer `event` for the next flush and return its assigned sequence
    /// number. Not durable until [`Self::flush`] runs.
    pub fn append(&mut self, event: &Event) -> Result<u64, WalError> {
        self.write_seq += 1;
        let seq = self.write_seq;
        let bytes = serde_json::to_vec(&RecordRef { seq, event })?;
        self.write_buffer.push(bytes);
        Ok(seq)
    }

    /// Whether the group-commit window has elapsed or the buffer has grown
    /// large enough to force an early flush.
    pub fn needs_flush(&self) -> bool {
        !self.write_buffer.is_empty()
            && (self.last_flush.elapsed() >= FLUSH_INTERVAL || self.write_buffer.len() >= FLUSH_THRESHOLD)
    }

    /// Write every buffered entry and `fsync` once. After this returns, the
    /// events appended since the last flush are durable.
    pub fn flush(&mut self) -> Result<(), WalError> {
        if self.write_buffer.is_empty() {
            return Ok(());
        }
        for mut bytes in self.write_buffer.drain(..) {
            bytes.push(b'\n');
            self.file.write_all(&bytes)?;
        }
        self.file.sync_all()?;
        self.last_flush = Instant::now();
        Ok(())
    }

    /// The next entry past the read cursor that hasn't been marked
    /// processed, or `None` if the journal is caught up. Flushes first so
    /// a just-appended entry is immediately visible to this read.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        self.flush()?;

        let mut reader = BufReader::new(&self.read_file);
        reader.seek(SeekFrom::Start(self.read_offset))?;

        let mut line = String::new();
        let read = match reader.read_line(&mut line) {
            Ok(0) => return Ok(None),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<Record>(trimmed) {
            Ok(record) => {
                self.read_offset += read as u64;
                Ok(Some(WalEntry { seq: record.seq, event: record.event }))
            }
            Err(e) => {
                warn!(offset = self.read_offset, error = %e, "corrupt journal entry, skipping");
                self.read_offset += read as u64;
                Ok(None)
            }
        }
    }

    /// Record that the dispatch loop has fully acted on `seq`. Only an
    /// in-memory cursor — durability of this value comes from the next
    /// snapshot, not the journal.
    pub fn mark_processed(&mut self, seq: u64) {
        self.processed_seq = seq;
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    /// Rewrite the journal keeping only entries with `seq >= seq`, called
    /// once a checkpoint has made everything before `seq` durable elsewhere.
    /// Atomic: writes a `.tmp` file and renames it over the original.
    pub fn truncate_before(&mut self, seq: u64) -> Result<(), WalError> {
        self.flush()?;

        let kept: Vec<(u64, String)> = {
            let scan = Self::scan(&self.file, self.processed_seq)?;
            if scan.corrupt {
                return Err(WalError::Corrupt {
                    offset: 0,
                    message: "journal corrupt during truncation scan".to_string(),
                });
            }
            scan.lines
                .into_iter()
                .filter_map(|line| {
                    let record: Record = serde_json::from_str(&line).ok()?;
                    (record.seq >= seq).then_some((record.seq, line))
                })
                .collect()
        };

        let tmp_path = self.path.with_extension("tmp");
        let new_read_offset = {
            let mut tmp_file = File::create(&tmp_path)?;
            let mut offset = 0u64;
            let mut unprocessed_offset = None;
            for (entry_seq, line) in &kept {
                if *entry_seq > self.processed_seq && unprocessed_offset.is_none() {
                    unprocessed_offset = Some(offset);
                }
                tmp_file.write_all(line.as_bytes())?;
                tmp_file.write_all(b"\n")?;
                offset += line.len() as u64 + 1;
            }
            tmp_file.sync_all()?;
            unprocessed_offset.unwrap_or(offset)
        };

        std::fs::rename(&tmp_path, &self.path)?;
        self.file = Self::open_append(&self.path)?;
        self.read_file = self.file.try_clone()?;
        self.read_offset = new_read_offset;
        Ok(())
    }

    /// Every durable entry with `seq` greater than the given sequence, in
    /// order. Used for startup recovery (replaying past a loaded snapshot).
    pub fn entries_after(&self, seq: u64) -> Result<Vec<WalEntry>, WalError> {
        let scan = Self::scan(&self.file, seq)?;
        scan.lines
            .into_iter()
            .filter_map(|line| serde_json::from_str::<Record>(&line).ok())
            .filter(|record| record.seq > seq)
            .map(|record| Ok(WalEntry { seq: record.seq, event: record.event }))
            .collect()
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
