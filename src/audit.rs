// ==============================================================================
// audit.rs - Harmonization Audit Log
// ==============================================================================
// Description: Companion log recording every identifier rewrite and warning
// Author: Matt Barham
// Created: 2025-10-31
// Modified: 2025-11-20
// Version: 2.0.0
// ==============================================================================
// One plain-text line per event, tagged with the 1-based target file line:
//   Line 2: rs1 changed to 1:1000:SNP.
//   Line 3 (WARNING): rs2 wasn't found in the map.
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::io::LineWriter;
use crate::resolver::AlleleWarning;
use crate::validator::Compression;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    Changed,
    NotFound,
    TypeMismatch,
    IncorrectAlleles,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub line: u64,
    pub event_type: AuditEventType,
    /// Identifier exactly as it appears in the target row
    pub identifier: String,
    /// Canonical identifier for `Changed`, allele rule for `IncorrectAlleles`
    pub detail: Option<String>,
    pub severity: LogSeverity,
}

impl AuditEvent {
    pub fn new(
        event_type: AuditEventType,
        line: u64,
        identifier: &str,
        detail: Option<String>,
    ) -> Self {
        let severity = match event_type {
            AuditEventType::Changed => LogSeverity::Info,
            AuditEventType::NotFound
            | AuditEventType::TypeMismatch
            | AuditEventType::IncorrectAlleles => LogSeverity::Warning,
        };

        Self {
            line,
            event_type,
            identifier: identifier.to_string(),
            detail,
            severity,
        }
    }

    pub fn changed(line: u64, identifier: &str, canonical: &str) -> Self {
        Self::new(AuditEventType::Changed, line, identifier, Some(canonical.to_string()))
    }

    pub fn not_found(line: u64, identifier: &str) -> Self {
        Self::new(AuditEventType::NotFound, line, identifier, None)
    }

    pub fn type_mismatch(line: u64, identifier: &str) -> Self {
        Self::new(AuditEventType::TypeMismatch, line, identifier, None)
    }

    pub fn incorrect_alleles(line: u64, identifier: &str, warning: AlleleWarning) -> Self {
        Self::new(
            AuditEventType::IncorrectAlleles,
            line,
            identifier,
            Some(warning.describe().to_string()),
        )
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            LogSeverity::Info => write!(f, "Line {}: ", self.line)?,
            LogSeverity::Warning => write!(f, "Line {} (WARNING): ", self.line)?,
        }

        let detail = self.detail.as_deref().unwrap_or_default();
        match self.event_type {
            AuditEventType::Changed => write!(f, "{} changed to {}.", self.identifier, detail),
            AuditEventType::NotFound => write!(f, "{} wasn't found in the map.", self.identifier),
            AuditEventType::TypeMismatch => {
                write!(f, "Type of {} doesn't match type in the map.", self.identifier)
            }
            AuditEventType::IncorrectAlleles => {
                write!(f, "{} has incorrect alleles ({}).", self.identifier, detail)
            }
        }
    }
}

/// Number of events recorded per type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTallies {
    pub changed: u64,
    pub not_found: u64,
    pub type_mismatch: u64,
    pub incorrect_alleles: u64,
}

impl EventTallies {
    fn record(&mut self, event_type: AuditEventType) {
        match event_type {
            AuditEventType::Changed => self.changed += 1,
            AuditEventType::NotFound => self.not_found += 1,
            AuditEventType::TypeMismatch => self.type_mismatch += 1,
            AuditEventType::IncorrectAlleles => self.incorrect_alleles += 1,
        }
    }

    pub fn warnings(&self) -> u64 {
        self.not_found + self.type_mismatch + self.incorrect_alleles
    }
}

/// Plain-text companion log for one harmonization run
#[derive(Debug)]
pub struct AuditLog {
    writer: LineWriter,
    tallies: EventTallies,
}

impl AuditLog {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            writer: LineWriter::create(path, Compression::Plain)?,
            tallies: EventTallies::default(),
        })
    }

    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    pub fn record(&mut self, event: &AuditEvent) -> Result<()> {
        self.tallies.record(event.event_type);
        self.writer.write_fmt(format_args!("{}\n", event))
    }

    pub fn tallies(&self) -> EventTallies {
        self.tallies
    }

    pub fn close(&mut self) -> Result<()> {
        self.writer.close()
    }
}
