// ==============================================================================
// io/reader.rs - Line Reader
// ==============================================================================
// Description: Line-oriented reader over plain text or gzip-compressed files
// Author: Matt Barham
// Created: 2025-11-14
// Modified: 2025-11-18
// Version: 1.0.0
// ==============================================================================
// Lines may end with "\n", "\r\n" or a bare "\r". The terminator is not part
// of the returned line. Lines are raw bytes; no encoding is assumed.
// Compression is detected from the gzip magic number.
// ==============================================================================

use flate2::read::MultiGzDecoder;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{HarmonizerError, Result};
use crate::validator::{detect_compression, Compression};

const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Buffered line reader that owns its file handle until `close`
pub struct LineReader {
    path: PathBuf,
    compression: Compression,
    inner: Option<Box<dyn BufRead>>,
    line: Vec<u8>,
    bytes_consumed: u64,
    at_eof: bool,
}

impl std::fmt::Debug for LineReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineReader")
            .field("path", &self.path)
            .field("compression", &self.compression)
            .field("open", &self.inner.is_some())
            .field("at_eof", &self.at_eof)
            .finish()
    }
}

impl LineReader {
    /// Open `path`, choosing plain or gzip decoding from its first bytes
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let compression = detect_compression(&path)?;
        let inner = Self::open_stream(&path, compression)?;

        Ok(Self {
            path,
            compression,
            inner: Some(inner),
            line: Vec::new(),
            bytes_consumed: 0,
            at_eof: false,
        })
    }

    fn open_stream(path: &Path, compression: Compression) -> Result<Box<dyn BufRead>> {
        let file = File::open(path).map_err(|source| HarmonizerError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(match compression {
            Compression::Plain => Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)),
            Compression::Gzip => Box::new(BufReader::with_capacity(
                READ_BUFFER_SIZE,
                MultiGzDecoder::new(file),
            )),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// True before the first byte has been consumed
    pub fn is_sof(&self) -> bool {
        self.bytes_consumed == 0
    }

    /// True once a read has hit end of stream
    pub fn is_eof(&self) -> bool {
        self.at_eof
    }

    /// Read the next line as raw bytes
    ///
    /// Returns `Ok(None)` at end of stream. An empty line is returned as
    /// `Some(b"")`; callers decide whether that is acceptable.
    pub fn read_line(&mut self) -> Result<Option<&[u8]>> {
        let path = &self.path;
        let read_error = |source: io::Error| HarmonizerError::Read {
            path: path.clone(),
            source,
        };

        let inner = match self.inner.as_mut() {
            Some(inner) => inner,
            None => {
                return Err(read_error(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "reader is closed",
                )))
            }
        };

        self.line.clear();
        let mut terminated = false;

        while !terminated {
            let available = inner.fill_buf().map_err(read_error)?;
            if available.is_empty() {
                self.at_eof = true;
                break;
            }

            let (used, ends_line, carriage_return) =
                match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                    Some(i) => {
                        self.line.extend_from_slice(&available[..i]);
                        (i + 1, true, available[i] == b'\r')
                    }
                    None => {
                        self.line.extend_from_slice(available);
                        (available.len(), false, false)
                    }
                };
            inner.consume(used);
            self.bytes_consumed += used as u64;

            if carriage_return {
                let next = inner.fill_buf().map_err(read_error)?;
                if next.first() == Some(&b'\n') {
                    inner.consume(1);
                    self.bytes_consumed += 1;
                }
            }
            terminated = ends_line;
        }

        if !terminated && self.line.is_empty() {
            return Ok(None);
        }

        Ok(Some(&self.line))
    }

    /// Read the next line as text, replacing invalid UTF-8 sequences
    pub fn read_line_lossy(&mut self) -> Result<Option<Cow<'_, str>>> {
        Ok(self.read_line()?.map(String::from_utf8_lossy))
    }

    /// Rewind to the beginning of the file
    pub fn reset(&mut self) -> Result<()> {
        if self.inner.is_none() {
            return Ok(());
        }
        self.inner = Some(Self::open_stream(&self.path, self.compression)?);
        self.line.clear();
        self.bytes_consumed = 0;
        self.at_eof = false;
        Ok(())
    }

    /// Release the file handle
    pub fn close(&mut self) -> Result<()> {
        self.inner = None;
        self.line.clear();
        Ok(())
    }
}
