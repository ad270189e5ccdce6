// ==============================================================================
// parsers/target.rs - Target GWAS File Header
// ==============================================================================
// Description: Column discovery for GWAS result files being harmonized
// Author: Matt Barham
// Created: 2025-11-14
// Modified: 2025-11-20
// Version: 1.0.0
// ==============================================================================
// Format: single-character separated text with one header row
// Example (tab-separated):
//   MARKER    EFFECT_ALLELE    OTHER_ALLELE    PVALUE
//   rs1       A                G               0.01
//   2:500     AT               A               0.20
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{HarmonizerError, Result};
use crate::validator::require_non_empty;

/// Names of the allele columns in a target file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlleleColumns {
    pub ref_allele: String,
    pub nonref_allele: String,
}

/// Column names to look for in the target header (case-insensitive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetColumns {
    /// Variant identifier column (rsID or chrom:pos[:type])
    pub id: String,

    /// Allele columns; when present harmonization checks allele consistency
    pub alleles: Option<AlleleColumns>,
}

impl TargetColumns {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            alleles: None,
        }
    }

    pub fn with_alleles(
        mut self,
        ref_allele: impl Into<String>,
        nonref_allele: impl Into<String>,
    ) -> Self {
        self.alleles = Some(AlleleColumns {
            ref_allele: ref_allele.into(),
            nonref_allele: nonref_allele.into(),
        });
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_non_empty("id_column_name", &self.id)?;
        if let Some(alleles) = &self.alleles {
            require_non_empty("ref_allele_column_name", &alleles.ref_allele)?;
            require_non_empty("nonref_allele_column_name", &alleles.nonref_allele)?;
        }
        Ok(())
    }
}

/// Column layout captured from a target header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLayout {
    /// Single ASCII byte separating fields
    pub separator: u8,

    /// Number of fields every data row must have
    pub column_count: usize,

    pub id_position: usize,

    /// (reference allele, non-reference allele) positions
    pub allele_positions: Option<(usize, usize)>,

    /// Header line exactly as read, written back unchanged
    pub header: Vec<u8>,
}

impl TargetLayout {
    /// Locate the configured columns in `header`
    ///
    /// If a name occurs more than once the last occurrence wins. Every
    /// separator starts a new field, so a trailing separator adds an empty
    /// column (unlike a strtok-style tokenizer, which would skip it).
    pub fn from_header(
        header: &[u8],
        columns: &TargetColumns,
        separator: u8,
        path: &Path,
    ) -> Result<Self> {
        let mut id_position = None;
        let mut ref_position = None;
        let mut nonref_position = None;
        let mut column_count = 0;

        for (i, name) in split_fields(header, separator).enumerate() {
            if name.eq_ignore_ascii_case(columns.id.as_bytes()) {
                id_position = Some(i);
            } else if let Some(alleles) = &columns.alleles {
                if name.eq_ignore_ascii_case(alleles.ref_allele.as_bytes()) {
                    ref_position = Some(i);
                } else if name.eq_ignore_ascii_case(alleles.nonref_allele.as_bytes()) {
                    nonref_position = Some(i);
                }
            }
            column_count += 1;
        }

        let missing = |column: &str| HarmonizerError::MissingTargetColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        };

        let allele_positions = match &columns.alleles {
            Some(alleles) => Some((
                ref_position.ok_or_else(|| missing(&alleles.ref_allele))?,
                nonref_position.ok_or_else(|| missing(&alleles.nonref_allele))?,
            )),
            None => None,
        };
        let id_position = id_position.ok_or_else(|| missing(&columns.id))?;

        Ok(Self {
            separator,
            column_count,
            id_position,
            allele_positions,
            header: header.to_vec(),
        })
    }

    pub fn has_alleles(&self) -> bool {
        self.allele_positions.is_some()
    }
}

/// Split a raw line on `separator`, keeping empty fields
pub fn split_fields(line: &[u8], separator: u8) -> impl Iterator<Item = &[u8]> {
    line.split(move |&b| b == separator)
}

/// Resolve a separator given by name or as a single ASCII character
///
/// Accepted names: `tab`, `comma`, `space`, `whitespace`, `semicolon`.
pub fn parse_separator(value: &str) -> std::result::Result<char, String> {
    match value.to_ascii_lowercase().as_str() {
        "tab" | "\\t" => return Ok('\t'),
        "comma" => return Ok(','),
        "space" | "whitespace" => return Ok(' '),
        "semicolon" => return Ok(';'),
        _ => {}
    }

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(format!(
            "invalid separator '{}' (use tab, comma, space, semicolon or a single ASCII character)",
            value
        )),
    }
}
