// ==============================================================================
// report.rs - Harmonization Run Report
// ==============================================================================
// Description: Machine-readable summary of one harmonize call
// Author: Matt Barham
// Created: 2025-11-17
// Modified: 2025-11-20
// Version: 1.0.0
// ==============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::audit::EventTallies;
use crate::error::{HarmonizerError, Result};
use crate::index::IndexStats;
use crate::validator::compute_sha256;

/// An input file and, when requested, its checksum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputFile {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl InputFile {
    pub fn describe(path: &Path, checksum: bool) -> Result<Self> {
        let sha256 = if checksum {
            Some(compute_sha256(path)?)
        } else {
            None
        };

        Ok(Self {
            path: path.to_path_buf(),
            sha256,
        })
    }
}

/// Target data rows seen and emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub read: u64,
    pub written: u64,
    pub dropped: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarmonizeReport {
    pub generated_at: DateTime<Utc>,
    pub map: InputFile,
    pub input: InputFile,
    pub output: PathBuf,
    pub log: PathBuf,
    pub with_alleles: bool,
    pub drop_unresolved: bool,
    pub rows: RowCounts,
    pub events: EventTallies,
    pub index: IndexStats,
}

impl HarmonizeReport {
    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let write_error = |source: io::Error| HarmonizerError::Write {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(|source| HarmonizerError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| write_error(io::Error::from(e)))?;
        writer.write_all(b"\n").map_err(write_error)?;
        writer.flush().map_err(|source| HarmonizerError::Close {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Report written: {}", path.display());
        Ok(())
    }
}
