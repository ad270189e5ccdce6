// ==============================================================================
// io/writer.rs - Line Writer
// ==============================================================================
// Description: Buffered text sink, optionally gzip-compressed
// Author: Matt Barham
// Created: 2025-11-14
// Modified: 2025-11-18
// Version: 1.0.0
// ==============================================================================

use flate2::write::GzEncoder;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{HarmonizerError, Result};
use crate::validator::Compression;

enum Sink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

/// Output file handle; must be closed explicitly to surface flush errors
pub struct LineWriter {
    path: PathBuf,
    sink: Option<Sink>,
}

impl fmt::Debug for LineWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineWriter")
            .field("path", &self.path)
            .field("open", &self.sink.is_some())
            .finish()
    }
}

impl LineWriter {
    /// Create (or truncate) `path`
    pub fn create(path: impl AsRef<Path>, compression: Compression) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| HarmonizerError::Open {
            path: path.clone(),
            source,
        })?;
        let buffered = BufWriter::new(file);

        let sink = match compression {
            Compression::Plain => Sink::Plain(buffered),
            Compression::Gzip => {
                Sink::Gzip(GzEncoder::new(buffered, flate2::Compression::default()))
            }
        };

        Ok(Self {
            path,
            sink: Some(sink),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: io::Error) -> HarmonizerError {
        HarmonizerError::Write {
            path: self.path.clone(),
            source,
        }
    }

    /// Append formatted text, e.g. `writer.write_fmt(format_args!("{}\n", line))`
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        let result = match self.sink.as_mut() {
            Some(Sink::Plain(w)) => w.write_fmt(args),
            Some(Sink::Gzip(w)) => w.write_fmt(args),
            None => Err(io::Error::new(io::ErrorKind::NotConnected, "writer is closed")),
        };
        result.map_err(|source| self.write_error(source))
    }

    /// Append raw bytes unchanged
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let result = match self.sink.as_mut() {
            Some(Sink::Plain(w)) => w.write_all(bytes),
            Some(Sink::Gzip(w)) => w.write_all(bytes),
            None => Err(io::Error::new(io::ErrorKind::NotConnected, "writer is closed")),
        };
        result.map_err(|source| self.write_error(source))
    }

    /// Flush buffers and finish the gzip stream; closing twice is a no-op
    pub fn close(&mut self) -> Result<()> {
        let result = match self.sink.take() {
            Some(Sink::Plain(mut w)) => w.flush(),
            Some(Sink::Gzip(w)) => w.finish().and_then(|mut inner| inner.flush()),
            None => Ok(()),
        };
        result.map_err(|source| HarmonizerError::Close {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::MultiGzDecoder;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_plain_writer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut writer = LineWriter::create(&path, Compression::Plain).unwrap();
        write!(writer, "{}\t{}\n", "rs1", 42).unwrap();
        writer.write_bytes(b"M\xfcller\n").unwrap();
        writer.close().unwrap();
        writer.close().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"rs1\t42\nM\xfcller\n");
        assert!(writer.write_bytes(b"late").is_err());
    }

    #[test]
    fn test_gzip_writer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt.gz");

        let mut writer = LineWriter::create(&path, Compression::Gzip).unwrap();
        writer.write_bytes(b"MARKER\tA1\n1:100:SNP\tA\n").unwrap();
        writer.close().unwrap();

        let mut decoded = String::new();
        MultiGzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "MARKER\tA1\n1:100:SNP\tA\n");
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let err = LineWriter::create("/nonexistent/dir/out.txt", Compression::Plain).unwrap_err();
        assert!(matches!(err, HarmonizerError::Open { .. }));
    }
}
