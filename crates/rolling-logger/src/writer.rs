//! Rolling File Writer
//!
//! Size-bounded log file set plus an in-memory ring of the most recent lines.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing_subscriber::fmt::MakeWriter;

/// Rotation and buffer limits
#[derive(Debug, Clone)]
pub struct RollingOptions {
    /// Size at which the current file is rotated out
    pub max_bytes: u64,
    /// Total number of files kept, including the current one
    pub max_files: usize,
    /// Number of lines kept in memory for `recent_lines`
    pub buffer_lines: usize,
}

impl Default for RollingOptions {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024,
            max_files: 5,
            buffer_lines: 200,
        }
    }
}

struct RollingState {
    dir: PathBuf,
    base_name: String,
    options: RollingOptions,
    file: File,
    written: u64,
    recent: VecDeque<String>,
    pending: String,
}

impl RollingState {
    fn open(dir: &Path, base_name: &str, options: RollingOptions) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(base_name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            dir: dir.to_path_buf(),
            base_name: base_name.to_string(),
            options,
            file,
            written,
            recent: VecDeque::new(),
            pending: String::new(),
        })
    }

    fn current_path(&self) -> PathBuf {
        self.dir.join(&self.base_name)
    }

    fn archive_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.{}", self.base_name, index))
    }

    /// Shift `name.log.N` up by one, dropping the oldest, and start a fresh file
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let archives = self.options.max_files.saturating_sub(1);
        if archives == 0 {
            self.file = File::create(self.current_path())?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.archive_path(archives);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..archives).rev() {
            let from = self.archive_path(index);
            if from.exists() {
                fs::rename(&from, self.archive_path(index + 1))?;
            }
        }
        fs::rename(self.current_path(), self.archive_path(1))?;

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.current_path())?;
        self.written = 0;
        Ok(())
    }

    fn append(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.written > 0 && self.written + buf.len() as u64 > self.options.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        self.remember(buf);
        Ok(())
    }

    fn remember(&mut self, buf: &[u8]) {
        if self.options.buffer_lines == 0 {
            return;
        }
        self.pending.push_str(&String::from_utf8_lossy(buf));
        while let Some(pos) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=pos).collect();
            if self.recent.len() == self.options.buffer_lines {
                self.recent.pop_front();
            }
            self.recent
                .push_back(line.trim_end_matches(['\n', '\r']).to_string());
        }
    }
}

/// Shared handle to a rolling log file set
///
/// Cloning is cheap; all clones write to the same files.
#[derive(Clone)]
pub struct RollingFileWriter {
    state: Arc<Mutex<RollingState>>,
}

impl RollingFileWriter {
    /// Open (or continue) `dir/base_name`
    pub fn new(dir: &Path, base_name: &str, options: RollingOptions) -> io::Result<Self> {
        let state = RollingState::open(dir, base_name, options)?;
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, RollingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Path of the file currently being written
    pub fn current_path(&self) -> PathBuf {
        self.lock().current_path()
    }

    /// Last `count` complete lines, oldest first
    pub fn recent_lines(&self, count: usize) -> Vec<String> {
        let state = self.lock();
        let skip = state.recent.len().saturating_sub(count);
        state.recent.iter().skip(skip).cloned().collect()
    }
}

/// Per-event writer handed out to `tracing-subscriber`
pub struct RollingHandle {
    state: Arc<Mutex<RollingState>>,
}

impl Write for RollingHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingFileWriter {
    type Writer = RollingHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RollingHandle {
            state: Arc::clone(&self.state),
        }
    }
}
