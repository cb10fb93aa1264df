//! Loading and saving of recording files against a shared store pair.

use super::io::{ExecutionDataReader, ExecutionDataWriter};
use super::{ExecutionDataStore, SessionInfoStore};
use crate::result::{SumarError, SumarResult};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

/// Owns one execution/session store pair and streams recording files into
/// it. A loader is created fresh per report or merge pass and the stores
/// are read-shared afterwards; loading order does not affect the result.
#[derive(Debug, Default)]
pub struct ExecFileLoader {
    executions: ExecutionDataStore,
    sessions: SessionInfoStore,
}

impl ExecFileLoader {
    /// Create a loader with empty stores
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append all records from a raw byte stream
    pub fn load(&mut self, input: impl Read) -> SumarResult<()> {
        let mut reader = ExecutionDataReader::new(BufReader::new(input));
        reader.read(&mut self.executions, &mut self.sessions)?;
        Ok(())
    }

    /// Append all records from a recording file
    pub fn load_file(&mut self, path: &Path) -> SumarResult<()> {
        let file = File::open(path).map_err(|e| SumarError::file(path, e))?;
        self.load(file)
    }

    /// Serialize the stores to a recording file.
    ///
    /// Parent directories are created as needed. An exclusive advisory lock
    /// is held for the duration of the write so concurrent writers
    /// targeting the same destination cannot interleave.
    pub fn save(&self, path: &Path, append: bool) -> SumarResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| SumarError::file(parent, e))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(append)
            .write(true)
            .truncate(!append)
            .open(path)
            .map_err(|e| SumarError::file(path, e))?;
        file.lock_exclusive().map_err(|e| SumarError::file(path, e))?;

        let result = self.write_to(&file);

        let unlock = FileExt::unlock(&file).map_err(|e| SumarError::file(path, e));
        result.and(unlock)
    }

    fn write_to(&self, file: &File) -> SumarResult<()> {
        let mut writer = ExecutionDataWriter::new(BufWriter::new(file))?;
        for info in self.sessions.infos() {
            writer.write_session_info(info)?;
        }
        for data in self.executions.contents() {
            writer.write_execution_data(data)?;
        }
        writer.flush()
    }

    /// Merged execution records
    #[must_use]
    pub fn execution_data(&self) -> &ExecutionDataStore {
        &self.executions
    }

    /// Sessions in load order
    #[must_use]
    pub fn session_infos(&self) -> &SessionInfoStore {
        &self.sessions
    }
}
