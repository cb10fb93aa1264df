//! Binary recording format: a header block followed by typed records.
//!
//! ```text
//! 0x01  header: magic u16 (big-endian), format version u16 (big-endian)
//! 0x10  session-info record (bincode payload)
//! 0x11  execution-data record (bincode payload)
//! ```
//!
//! The header must come first. A zero-byte input is a valid empty
//! recording. Anything else malformed maps to
//! [`SumarError::CorruptData`] or [`SumarError::VersionMismatch`].

use super::{ExecutionData, ExecutionDataStore, SessionInfo, SessionInfoStore};
use crate::result::{SumarError, SumarResult};
use bincode::Options;
use std::io::{ErrorKind, Read, Write};

/// File magic, first field of the header block
pub const MAGIC: u16 = 0xA9C0;

/// Format version written and understood by this library
pub const FORMAT_VERSION: u16 = 0x0001;

const BLOCK_HEADER: u8 = 0x01;
const BLOCK_SESSION_INFO: u8 = 0x10;
const BLOCK_EXECUTION_DATA: u8 = 0x11;

/// Upper bound for a single record payload; anything larger is corrupt.
const MAX_RECORD_BYTES: u64 = 16 * 1024 * 1024;

fn codec() -> impl Options {
    bincode::options().with_limit(MAX_RECORD_BYTES)
}

fn corrupt_payload(err: &bincode::Error) -> SumarError {
    SumarError::corrupt(format!("truncated or malformed record payload: {err}"))
}

/// Streaming reader folding typed records into the execution/session stores.
pub struct ExecutionDataReader<R: Read> {
    input: R,
    header_seen: bool,
}

impl<R: Read> ExecutionDataReader<R> {
    /// Create a reader over a raw byte stream
    pub fn new(input: R) -> Self {
        Self {
            input,
            header_seen: false,
        }
    }

    /// Read all records, appending into the given stores.
    ///
    /// Returns the number of execution-data records read.
    pub fn read(
        &mut self,
        executions: &mut ExecutionDataStore,
        sessions: &mut SessionInfoStore,
    ) -> SumarResult<usize> {
        let mut count = 0;
        while let Some(tag) = self.next_block_tag()? {
            match tag {
                BLOCK_HEADER => self.read_header()?,
                BLOCK_SESSION_INFO => {
                    self.require_header()?;
                    let info: SessionInfo = codec()
                        .deserialize_from(&mut self.input)
                        .map_err(|e| corrupt_payload(&e))?;
                    sessions.push(info);
                }
                BLOCK_EXECUTION_DATA => {
                    self.require_header()?;
                    let data: ExecutionData = codec()
                        .deserialize_from(&mut self.input)
                        .map_err(|e| corrupt_payload(&e))?;
                    executions.put(data)?;
                    count += 1;
                }
                other => {
                    return Err(SumarError::corrupt(format!(
                        "unknown block type {other:#04x}"
                    )))
                }
            }
        }
        Ok(count)
    }

    /// Next block tag, or `None` at a clean end of stream.
    fn next_block_tag(&mut self) -> SumarResult<Option<u8>> {
        let mut tag = [0u8; 1];
        match self.input.read_exact(&mut tag) {
            Ok(()) => Ok(Some(tag[0])),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_header(&mut self) -> SumarResult<()> {
        let magic = self.read_u16()?;
        let version = self.read_u16()?;
        if magic != MAGIC {
            return Err(SumarError::corrupt(format!(
                "bad file magic {magic:#06x}"
            )));
        }
        if version != FORMAT_VERSION {
            return Err(SumarError::VersionMismatch {
                found: version,
                expected: FORMAT_VERSION,
            });
        }
        self.header_seen = true;
        Ok(())
    }

    fn require_header(&self) -> SumarResult<()> {
        if self.header_seen {
            Ok(())
        } else {
            Err(SumarError::corrupt("record before file header"))
        }
    }

    fn read_u16(&mut self) -> SumarResult<u16> {
        let mut buf = [0u8; 2];
        self.input
            .read_exact(&mut buf)
            .map_err(|_| SumarError::corrupt("truncated file header"))?;
        Ok(u16::from_be_bytes(buf))
    }
}

/// Writer producing the recording format, header first.
pub struct ExecutionDataWriter<W: Write> {
    output: W,
}

impl<W: Write> ExecutionDataWriter<W> {
    /// Create a writer and emit the header block
    pub fn new(mut output: W) -> SumarResult<Self> {
        output.write_all(&[BLOCK_HEADER])?;
        output.write_all(&MAGIC.to_be_bytes())?;
        output.write_all(&FORMAT_VERSION.to_be_bytes())?;
        Ok(Self { output })
    }

    /// Write one session-info record
    pub fn write_session_info(&mut self, info: &SessionInfo) -> SumarResult<()> {
        self.output.write_all(&[BLOCK_SESSION_INFO])?;
        codec()
            .serialize_into(&mut self.output, info)
            .map_err(|e| SumarError::corrupt(format!("unable to encode session info: {e}")))
    }

    /// Write one execution-data record
    pub fn write_execution_data(&mut self, data: &ExecutionData) -> SumarResult<()> {
        self.output.write_all(&[BLOCK_EXECUTION_DATA])?;
        codec()
            .serialize_into(&mut self.output, data)
            .map_err(|e| SumarError::corrupt(format!("unable to encode execution data: {e}")))
    }

    /// Flush the underlying stream
    pub fn flush(&mut self) -> SumarResult<()> {
        self.output.flush()?;
        Ok(())
    }
}
