// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::domain::models::task::CrawlTask;
use crate::domain::repositories::progress_repository::{ProgressError, ProgressRepository};

/// 快照文件名
pub const SNAPSHOT_FILE: &str = "crawl_task_cache.json";
/// 增量日志文件名
pub const JOURNAL_FILE: &str = "crawl_task_cache.journal";

/// 增量日志条目，每行一个 JSON 对象
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum JournalEntry {
    Complete { key: String },
    Clear { stock_code: Option<String> },
}

struct LedgerState {
    entries: BTreeMap<String, bool>,
    journal: Option<File>,
    journal_len: usize,
}

impl LedgerState {
    fn apply(&mut self, entry: &JournalEntry) {
        match entry {
            JournalEntry::Complete { key } => {
                self.entries.insert(key.clone(), true);
            }
            JournalEntry::Clear { stock_code: Some(code) } => {
                let prefix = format!("{}_", code);
                self.entries.retain(|k, _| !k.starts_with(&prefix));
            }
            JournalEntry::Clear { stock_code: None } => self.entries.clear(),
        }
    }
}

/// 断点续爬进度账本
///
/// 启动时加载快照并重放增量日志。每次变更先追加到日志并 fsync，
/// 日志条数达到阈值后重写快照（临时文件 + rename）并截断日志。
/// 所有变更在同一把锁内完成，多个解析工作器并发写入不会丢失更新。
pub struct ProgressStore {
    snapshot_path: PathBuf,
    journal_path: PathBuf,
    compact_threshold: usize,
    state: Mutex<LedgerState>,
}

impl ProgressStore {
    /// 打开（或创建）缓存目录下的进度账本
    ///
    /// # 参数
    ///
    /// * `cache_dir` - 缓存目录
    /// * `compact_threshold` - 日志压缩阈值，0 表示每次写入都重写快照
    ///
    /// 快照或日志损坏时记录错误并忽略，只有目录无法创建时才返回错误
    pub fn open(cache_dir: impl AsRef<Path>, compact_threshold: usize) -> Result<Self, ProgressError> {
        let cache_dir = cache_dir.as_ref();
        fs::create_dir_all(cache_dir)?;

        let snapshot_path = cache_dir.join(SNAPSHOT_FILE);
        let journal_path = cache_dir.join(JOURNAL_FILE);

        let mut state = LedgerState {
            entries: load_snapshot(&snapshot_path),
            journal: None,
            journal_len: 0,
        };
        for entry in load_journal(&journal_path) {
            state.apply(&entry);
            state.journal_len += 1;
        }

        info!(
            path = %snapshot_path.display(),
            completed = state.entries.values().filter(|v| **v).count(),
            "Progress ledger loaded"
        );

        Ok(Self {
            snapshot_path,
            journal_path,
            compact_threshold,
            state: Mutex::new(state),
        })
    }

    /// 快照文件路径
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// 账本中的条目数
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 已完成任务的键，按字典序排列
    pub fn completed_keys(&self) -> Vec<String> {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|(_, done)| **done)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// 立即把内存状态写成快照并截断日志
    pub fn compact(&self) -> Result<(), ProgressError> {
        let mut state = self.state.lock();
        self.compact_locked(&mut state)
    }

    fn record(&self, entry: JournalEntry) -> Result<(), ProgressError> {
        let mut state = self.state.lock();
        state.apply(&entry);

        if self.compact_threshold == 0 {
            return self.compact_locked(&mut state);
        }

        self.append_locked(&mut state, &entry)?;
        if state.journal_len >= self.compact_threshold {
            self.compact_locked(&mut state)?;
        }
        Ok(())
    }

    fn append_locked(&self, state: &mut LedgerState, entry: &JournalEntry) -> Result<(), ProgressError> {
        let line = serde_json::to_string(entry)?;

        if state.journal.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.journal_path)?;
            state.journal = Some(file);
        }

        if let Some(file) = state.journal.as_mut() {
            writeln!(file, "{}", line)?;
            file.sync_data()?;
        }
        state.journal_len += 1;
        Ok(())
    }

    fn compact_locked(&self, state: &mut LedgerState) -> Result<(), ProgressError> {
        let json = serde_json::to_string_pretty(&state.entries)?;

        let tmp_path = self.snapshot_path.with_extension("json.tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(json.as_bytes())?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.snapshot_path)?;

        // Stale journal entries replay idempotently over the new snapshot.
        state.journal = None;
        File::create(&self.journal_path)?.sync_all()?;
        state.journal_len = 0;

        debug!(entries = state.entries.len(), "Progress ledger compacted");
        Ok(())
    }
}

impl ProgressRepository for ProgressStore {
    fn is_complete(&self, task: &CrawlTask) -> bool {
        self.state
            .lock()
            .entries
            .get(&task.key())
            .copied()
            .unwrap_or(false)
    }

    fn mark_complete(&self, task: &CrawlTask) -> Result<(), ProgressError> {
        self.record(JournalEntry::Complete { key: task.key() })?;
        debug!(task = %task, "Marked task as crawled");
        Ok(())
    }

    fn clear(&self, stock_code: Option<&str>) -> Result<(), ProgressError> {
        let entry = JournalEntry::Clear {
            stock_code: stock_code.map(str::to_string),
        };

        // The clear is journaled before compaction so it survives a crash in between.
        let mut state = self.state.lock();
        state.apply(&entry);
        if self.compact_threshold > 0 {
            self.append_locked(&mut state, &entry)?;
        }
        self.compact_locked(&mut state)?;

        match stock_code {
            Some(code) => info!(stock_code = code, "Cleared crawl progress for stock"),
            None => info!("Cleared all crawl progress"),
        }
        Ok(())
    }
}

fn load_snapshot(path: &Path) -> BTreeMap<String, bool> {
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                error!(path = %path.display(), "Failed to parse progress snapshot, starting empty: {}", e);
                BTreeMap::new()
            }
        },
        Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
        Err(e) => {
            error!(path = %path.display(), "Failed to read progress snapshot, starting empty: {}", e);
            BTreeMap::new()
        }
    }
}

fn load_journal(path: &Path) -> Vec<JournalEntry> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            error!(path = %path.display(), "Failed to open progress journal: {}", e);
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(line = index + 1, "Stopped reading progress journal: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!(line = index + 1, "Skipping corrupt journal entry: {}", e),
        }
    }
    entries
}

#[cfg(test)]
#[path = "progress_store_test.rs"]
mod tests;
