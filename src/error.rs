// ==============================================================================
// error.rs - Harmonizer Error Types
// ==============================================================================
// Description: Structured errors for map indexing and target harmonization
// Author: Matt Barham
// Created: 2025-11-14
// Modified: 2025-11-20
// Version: 1.1.0
// ==============================================================================
// Every fatal condition is a typed variant. Callers add provenance frames with
// `WithContext::context`, which nests the original error as `source()` so the
// whole chain can be printed at the binary boundary.
// ==============================================================================

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of fatal errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Empty or otherwise invalid caller-supplied argument
    Argument,
    /// Open, read, write or close failure on a file
    Io,
    /// Malformed reference or target file content
    Format,
}

/// Errors raised while indexing the reference map or harmonizing a target file
#[derive(Error, Debug)]
pub enum HarmonizerError {
    #[error("The '{0}' argument has an invalid value.")]
    InvalidArgument(&'static str),

    #[error("The reference map has not been indexed.")]
    MapNotIndexed,

    #[error("Error while opening '{}' file.", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error while closing '{}' file.", path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error while reading '{}' file.", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error while writing '{}' file.", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("The mandatory VCF file format information line is incorrect in '{}' file.", path.display())]
    IncorrectFormatLine { path: PathBuf },

    #[error("The mandatory VCF file format information line is empty in '{}' file.", path.display())]
    EmptyFormatLine { path: PathBuf },

    #[error("The mandatory VCF header line was not found in '{}' file.", path.display())]
    HeaderNotFound { path: PathBuf },

    #[error("Column '{expected}' is missing on position {position} (found '{found}').")]
    MissingMapColumn {
        expected: &'static str,
        found: String,
        position: usize,
    },

    #[error("The header/meta-information on line {line} is incorrect.")]
    IncorrectMetaLine { line: u64 },

    #[error("Line {line} in '{}' file is empty.", path.display())]
    EmptyLine { path: PathBuf, line: u64 },

    #[error("Line {line} in '{}' file contains less columns ({found}) than expected ({expected}).", path.display())]
    TooFewColumns {
        path: PathBuf,
        line: u64,
        found: usize,
        expected: usize,
    },

    #[error("Line {line} in '{}' file contains more columns ({found}) than expected ({expected}).", path.display())]
    TooManyColumns {
        path: PathBuf,
        line: u64,
        found: usize,
        expected: usize,
    },

    #[error("The header is missing on line {line} in '{}' file.", path.display())]
    MissingHeader { path: PathBuf, line: u64 },

    #[error("Column '{column}' is missing in the header of '{}' file.", path.display())]
    MissingTargetColumn { column: String, path: PathBuf },

    #[error("The chromosomal position '{value}' on line {line} in file '{}' could not be parsed to unsigned integer.", path.display())]
    InvalidPosition {
        value: String,
        line: u64,
        path: PathBuf,
    },

    #[error("{component}::{operation}")]
    Context {
        component: &'static str,
        operation: &'static str,
        #[source]
        source: Box<HarmonizerError>,
    },
}

impl HarmonizerError {
    /// Innermost error, skipping any context frames
    pub fn root(&self) -> &HarmonizerError {
        let mut current = self;
        while let HarmonizerError::Context { source, .. } = current {
            current = source;
        }
        current
    }

    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            HarmonizerError::InvalidArgument(_) | HarmonizerError::MapNotIndexed => {
                ErrorKind::Argument
            }
            HarmonizerError::Open { .. }
            | HarmonizerError::Close { .. }
            | HarmonizerError::Read { .. }
            | HarmonizerError::Write { .. } => ErrorKind::Io,
            _ => ErrorKind::Format,
        }
    }

    /// Line number carried by the innermost error, if any
    pub fn line(&self) -> Option<u64> {
        match self.root() {
            HarmonizerError::IncorrectMetaLine { line }
            | HarmonizerError::EmptyLine { line, .. }
            | HarmonizerError::TooFewColumns { line, .. }
            | HarmonizerError::TooManyColumns { line, .. }
            | HarmonizerError::MissingHeader { line, .. }
            | HarmonizerError::InvalidPosition { line, .. } => Some(*line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarmonizerError>;

/// Attach a `component::operation` frame to an error on its way up
pub trait WithContext<T> {
    fn context(self, component: &'static str, operation: &'static str) -> Result<T>;
}

impl<T> WithContext<T> for Result<T> {
    fn context(self, component: &'static str, operation: &'static str) -> Result<T> {
        self.map_err(|source| HarmonizerError::Context {
            component,
            operation,
            source: Box::new(source),
        })
    }
}
