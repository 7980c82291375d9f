use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::sprint::SprintRecord;

/// Hard cap on retained sessions; older entries are evicted silently.
pub const HISTORY_CAP: usize = 100;

/// Append-only (bounded) log of completed sprints, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryLog {
    #[serde(default)]
    entries: Vec<SprintRecord>,
    #[serde(default)]
    next_seq: u64,
}

impl HistoryLog {
    /// Insert-then-truncate. Assigns the record's `seq`, the log's true key,
    /// and returns the sequenced copy so callers can attach the identical
    /// record elsewhere.
    pub fn push(&mut self, mut record: SprintRecord) -> SprintRecord {
        self.next_seq += 1;
        record.seq = self.next_seq;
        self.entries.insert(0, record.clone());
        self.entries.truncate(HISTORY_CAP);
        record
    }

    /// Point edit: only title and word count are editable after the fact.
    pub fn edit(&mut self, seq: u64, title: &str, words: u32) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.seq == seq) {
            entry.title = title.to_string();
            entry.words = words;
            true
        } else {
            false
        }
    }

    pub fn delete(&mut self, seq: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.seq != seq);
        self.entries.len() != before
    }

    pub fn get(&self, seq: u64) -> Option<&SprintRecord> {
        self.entries.iter().find(|e| e.seq == seq)
    }

    pub fn entries(&self) -> &[SprintRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the whole log as CSV, newest first.
    pub fn export_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "date,mode,length_min,words,title,remaining_sec,target")?;
        for entry in &self.entries {
            writeln!(
                out,
                "{},{},{},{},{},{},{}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.mode,
                entry.length_min,
                entry.words,
                csv_field(&entry.title),
                entry.remaining_sec,
                entry
                    .target
                    .as_ref()
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
            )?;
        }
        Ok(())
    }

    pub fn export_csv_path<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        self.export_csv(file)
    }
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// `YYYY-MM-DD_title.txt`, title reduced to a filesystem-safe slug.
pub fn session_text_filename(record: &SprintRecord) -> String {
    let safe: String = record
        .title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' '))
        .take(40)
        .collect();
    let slug = safe.trim().replace(' ', "_");
    let slug = if slug.is_empty() {
        "session".to_string()
    } else {
        slug
    };
    format!("{}_{}.txt", record.timestamp.format("%Y-%m-%d"), slug)
}

/// Dump the record's full editor snapshot to a text file in `dir`.
pub fn export_session_text<P: AsRef<Path>>(record: &SprintRecord, dir: P) -> io::Result<PathBuf> {
    fs::create_dir_all(dir.as_ref())?;
    let path = dir.as_ref().join(session_text_filename(record));
    fs::write(&path, &record.editor_text)?;
    Ok(path)
}
