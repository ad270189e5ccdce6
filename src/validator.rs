// ==============================================================================
// validator.rs - Input File Validation
// ==============================================================================
// Description: Argument checks, compression sniffing and input checksums
// Author: Matt Barham
// Created: 2025-10-31
// Modified: 2025-11-18
// Version: 2.0.0
// ==============================================================================

use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{HarmonizerError, Result};

/// Gzip member magic number
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Extension appended to the primary output path for the companion log
pub const LOG_EXTENSION: &str = ".log";

/// Storage format of an input or output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Plain,
    Gzip,
}

/// Reject empty paths and names
pub fn require_non_empty<'a>(name: &'static str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(HarmonizerError::InvalidArgument(name));
    }
    Ok(value)
}

pub fn require_path<'a>(name: &'static str, path: &'a Path) -> Result<&'a Path> {
    if path.as_os_str().is_empty() {
        return Err(HarmonizerError::InvalidArgument(name));
    }
    Ok(path)
}

/// Decide between plain text and gzip by looking at the first two bytes
///
/// Files shorter than two bytes are treated as plain text.
pub fn detect_compression(path: &Path) -> Result<Compression> {
    let magic = read_magic_number(path).map_err(|source| HarmonizerError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let compression = if magic == GZIP_MAGIC {
        Compression::Gzip
    } else {
        Compression::Plain
    };
    debug!("Detected {:?} input: {}", compression, path.display());

    Ok(compression)
}

fn read_magic_number(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::with_capacity(GZIP_MAGIC.len());
    file.by_ref()
        .take(GZIP_MAGIC.len() as u64)
        .read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Companion log path: the output path with `.log` appended
pub fn log_path_for(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(LOG_EXTENSION);
    PathBuf::from(name)
}

/// Hex-encoded SHA-256 of a file's raw bytes
pub fn compute_sha256(path: &Path) -> Result<String> {
    let read_error = |source: io::Error| HarmonizerError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(|source| HarmonizerError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer).map_err(read_error)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
