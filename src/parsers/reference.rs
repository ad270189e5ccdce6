// ==============================================================================
// parsers/reference.rs - Reference Map Parser
// ==============================================================================
// Description: Strict parser for the VCF-like reference map used for harmonization
// Author: Matt Barham
// Created: 2025-11-03
// Modified: 2025-11-20
// Version: 2.0.0
// ==============================================================================
// Format:
//   ##fileformat=VCFv4.1
//   ##INFO=<ID=VT,...>                       (optional meta lines)
//   #CHROM  POS  ID  REF  ALT  QUAL  FILTER  INFO  FORMAT  [samples...]
//   1       1000 rs1 A    G    .     PASS    VT=SNP;AF=0.1 GT ...
// Every data line must have exactly as many tab-separated fields as the
// header. Variant type is SNP only if INFO declares VT=SNP.
// ==============================================================================

use std::path::Path;
use tracing::{debug, info};

use crate::error::{HarmonizerError, Result, WithContext};
use crate::io::LineReader;
use crate::models::{
    starts_with_ignore_case, strip_chromosome_prefix, ReferenceVariant, VariantType, SNP_TAG,
};

/// Key of the mandatory first line
pub const FILE_FORMAT_KEY: &str = "##fileformat";

pub const FIELD_SEPARATOR: char = '\t';

/// Header columns required, in order, at the start of the header line
pub const MANDATORY_COLUMNS: [&str; 9] = [
    "#CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO", "FORMAT",
];

const INFO_FIELD_SEPARATOR: char = ';';
const VARIANT_TYPE_KEY: &str = "VT";

const CHROM_FIELD: usize = 0;
const POS_FIELD: usize = 1;
const ID_FIELD: usize = 2;
const INFO_FIELD: usize = 7;

/// Single-pass reader for one reference map file
#[derive(Debug, Default)]
pub struct ReferenceMapParser {
    /// Number of lines consumed so far (1-based line of the last read)
    pub line_number: u64,

    /// Number of columns declared by the header line
    pub column_count: usize,

    /// Count of `##` meta-information lines seen
    pub meta_lines: usize,
}

impl ReferenceMapParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the whole map into unsorted variants, in file order
    ///
    /// The reader is closed on both success and failure; a close failure is
    /// only reported when parsing itself succeeded.
    pub fn parse(&mut self, path: impl AsRef<Path>) -> Result<Vec<ReferenceVariant>> {
        let path = path.as_ref();
        self.line_number = 0;
        self.column_count = 0;
        self.meta_lines = 0;

        let mut reader = LineReader::open(path).context("ReferenceMapParser", "open")?;

        let result = self
            .read_header(&mut reader)
            .context("ReferenceMapParser", "read_header")
            .and_then(|_| {
                self.read_data(&mut reader)
                    .context("ReferenceMapParser", "read_data")
            });
        let closed = reader.close().context("ReferenceMapParser", "close");

        let variants = result?;
        closed?;

        info!(
            "Loaded {} reference variants from {}",
            variants.len(),
            path.display()
        );
        Ok(variants)
    }

    fn read_header(&mut self, reader: &mut LineReader) -> Result<()> {
        let path = reader.path().to_path_buf();

        let format_line = match reader.read_line_lossy()? {
            Some(line) if !line.is_empty() => line,
            _ => return Err(HarmonizerError::EmptyFormatLine { path }),
        };
        self.line_number = 1;

        let key = format_line.split('=').next().unwrap_or_default().trim_end();
        if !key.eq_ignore_ascii_case(FILE_FORMAT_KEY) {
            return Err(HarmonizerError::IncorrectFormatLine { path });
        }

        loop {
            let line = match reader.read_line_lossy()? {
                Some(line) => line,
                None => return Err(HarmonizerError::HeaderNotFound { path }),
            };
            self.line_number += 1;

            if line.len() <= 1 {
                return Err(HarmonizerError::IncorrectMetaLine {
                    line: self.line_number,
                });
            }
            if !line.starts_with('#') {
                return Err(HarmonizerError::HeaderNotFound { path });
            }
            if line.starts_with("##") {
                self.meta_lines += 1;
                continue;
            }

            self.column_count = check_header_columns(&line)?;
            break;
        }

        debug!(
            "Map header on line {}: {} columns, {} meta lines",
            self.line_number, self.column_count, self.meta_lines
        );
        Ok(())
    }

    fn read_data(&mut self, reader: &mut LineReader) -> Result<Vec<ReferenceVariant>> {
        let path = reader.path().to_path_buf();
        let mut variants = Vec::new();

        while let Some(line) = reader.read_line_lossy()? {
            self.line_number += 1;

            if line.is_empty() {
                return Err(HarmonizerError::EmptyLine {
                    path,
                    line: self.line_number,
                });
            }

            let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
            if fields.len() < self.column_count {
                return Err(HarmonizerError::TooFewColumns {
                    path,
                    line: self.line_number,
                    found: fields.len(),
                    expected: self.column_count,
                });
            }
            if fields.len() > self.column_count {
                return Err(HarmonizerError::TooManyColumns {
                    path,
                    line: self.line_number,
                    found: fields.len(),
                    expected: self.column_count,
                });
            }

            variants.push(parse_record(&fields, self.line_number, &path)?);
        }

        Ok(variants)
    }
}

/// Validate the mandatory column names and return the total column count
fn check_header_columns(line: &str) -> Result<usize> {
    let mut count = 0;

    for (i, name) in line.split(FIELD_SEPARATOR).enumerate() {
        if let Some(expected) = MANDATORY_COLUMNS.get(i) {
            if !name.eq_ignore_ascii_case(expected) {
                return Err(HarmonizerError::MissingMapColumn {
                    expected: *expected,
                    found: name.to_string(),
                    position: i + 1,
                });
            }
        }
        count += 1;
    }

    if count < MANDATORY_COLUMNS.len() {
        return Err(HarmonizerError::MissingMapColumn {
            expected: MANDATORY_COLUMNS[count],
            found: String::new(),
            position: count + 1,
        });
    }

    Ok(count)
}

fn parse_record(fields: &[&str], line: u64, path: &Path) -> Result<ReferenceVariant> {
    let position_str = fields[POS_FIELD];
    let position = position_str
        .parse::<u64>()
        .map_err(|_| HarmonizerError::InvalidPosition {
            value: position_str.to_string(),
            line,
            path: path.to_path_buf(),
        })?;

    Ok(ReferenceVariant {
        chromosome: strip_chromosome_prefix(fields[CHROM_FIELD]).to_string(),
        position,
        id: fields[ID_FIELD].to_string(),
        variant_type: parse_variant_type(fields[INFO_FIELD]),
    })
}

/// Variant type declared by the first `VT` entry of an INFO field
///
/// Only `VT=SNP` (any case, surrounding whitespace ignored) yields a SNP.
/// Any other value, a bare `VT`, or no `VT` entry at all yields an indel.
pub fn parse_variant_type(info: &str) -> VariantType {
    for entry in info.split(INFO_FIELD_SEPARATOR) {
        let entry = entry.trim_start();
        if !starts_with_ignore_case(entry, VARIANT_TYPE_KEY) {
            continue;
        }

        if let Some((_, value)) = entry.split_once('=') {
            if value.trim().eq_ignore_ascii_case(SNP_TAG) {
                return VariantType::Snp;
            }
        }
        return VariantType::Indel;
    }

    VariantType::Indel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE1";

    fn create_test_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn map_with_rows(rows: &[&str]) -> NamedTempFile {
        let mut contents = format!("##fileformat=VCFv4.1\n##source=test\n{}\n", HEADER);
        for row in rows {
            contents.push_str(row);
            contents.push('\n');
        }
        create_test_file(&contents)
    }

    #[test]
    fn test_parse_valid_map() {
        let file = map_with_rows(&[
            "1\t1000\trs1\tA\tG\t.\tPASS\tVT=SNP;AF=0.1\tGT\t0|1",
            "chr2\t500\trsX\tA\tAT\t.\tPASS\tAF=0.2; VT=INDEL\tGT\t0|0",
            "X\t77\trs9\tC\tT\t.\tPASS\t.\tGT\t1|1",
        ]);
        let mut parser = ReferenceMapParser::new();

        let variants = parser.parse(file.path()).unwrap();

        assert_eq!(variants.len(), 3);
        assert_eq!(parser.column_count, 10);
        assert_eq!(parser.meta_lines, 1);
        assert_eq!(parser.line_number, 6);

        assert_eq!(variants[0].chromosome, "1");
        assert_eq!(variants[0].position, 1000);
        assert_eq!(variants[0].id, "rs1");
        assert_eq!(variants[0].variant_type, VariantType::Snp);

        assert_eq!(variants[1].chromosome, "2");
        assert_eq!(variants[1].variant_type, VariantType::Indel);

        // No VT entry defaults to indel
        assert_eq!(variants[2].variant_type, VariantType::Indel);
    }

    #[test]
    fn test_parse_variant_type() {
        assert_eq!(parse_variant_type("VT=SNP"), VariantType::Snp);
        assert_eq!(parse_variant_type("AF=0.3;  vt = snp "), VariantType::Snp);
        assert_eq!(parse_variant_type("VT=SV"), VariantType::Indel);
        assert_eq!(parse_variant_type("VT"), VariantType::Indel);
        assert_eq!(parse_variant_type("."), VariantType::Indel);
        // The first VT entry decides
        assert_eq!(parse_variant_type("VT=INDEL;VT=SNP"), VariantType::Indel);
    }

    #[test]
    fn test_incorrect_format_line() {
        let file = create_test_file(&format!("##format=VCFv4.1\n{}\n", HEADER));
        let err = ReferenceMapParser::new().parse(file.path()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(matches!(err.root(), HarmonizerError::IncorrectFormatLine { .. }));
    }

    #[test]
    fn test_empty_format_line() {
        let file = create_test_file(&format!("\n{}\n", HEADER));
        let err = ReferenceMapParser::new().parse(file.path()).unwrap_err();
        assert!(matches!(err.root(), HarmonizerError::EmptyFormatLine { .. }));

        let empty = create_test_file("");
        let err = ReferenceMapParser::new().parse(empty.path()).unwrap_err();
        assert!(matches!(err.root(), HarmonizerError::EmptyFormatLine { .. }));
    }

    #[test]
    fn test_header_not_found() {
        let file = create_test_file("##fileformat=VCFv4.1\n##meta=1\n");
        let err = ReferenceMapParser::new().parse(file.path()).unwrap_err();
        assert!(matches!(err.root(), HarmonizerError::HeaderNotFound { .. }));

        let file = create_test_file("##fileformat=VCFv4.1\n1\t100\trs1\n");
        let err = ReferenceMapParser::new().parse(file.path()).unwrap_err();
        assert!(matches!(err.root(), HarmonizerError::HeaderNotFound { .. }));
    }

    #[test]
    fn test_short_meta_line() {
        let file = create_test_file(&format!("##fileformat=VCFv4.1\n#\n{}\n", HEADER));
        let err = ReferenceMapParser::new().parse(file.path()).unwrap_err();

        match err.root() {
            HarmonizerError::IncorrectMetaLine { line } => assert_eq!(*line, 2),
            other => panic!("Expected IncorrectMetaLine, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_header_column() {
        let file = create_test_file(
            "##fileformat=VCFv4.1\n#CHROM\tPOS\tRSID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\n",
        );
        let err = ReferenceMapParser::new().parse(file.path()).unwrap_err();

        match err.root() {
            HarmonizerError::MissingMapColumn {
                expected,
                found,
                position,
            } => {
                assert_eq!(*expected, "ID");
                assert_eq!(found, "RSID");
                assert_eq!(*position, 3);
            }
            other => panic!("Expected MissingMapColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_header_case_insensitive_and_truncated() {
        let file = create_test_file(
            "##FILEFORMAT=VCFv4.1\n#chrom\tpos\tid\tref\talt\tqual\tfilter\tinfo\tformat\n",
        );
        let variants = ReferenceMapParser::new().parse(file.path()).unwrap();
        assert!(variants.is_empty());

        let file = create_test_file("##fileformat=VCFv4.1\n#CHROM\tPOS\tID\n");
        let err = ReferenceMapParser::new().parse(file.path()).unwrap_err();
        match err.root() {
            HarmonizerError::MissingMapColumn { expected, position, .. } => {
                assert_eq!(*expected, "REF");
                assert_eq!(*position, 4);
            }
            other => panic!("Expected MissingMapColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_column_count_mismatch() {
        let file = map_with_rows(&["1\t1000\trs1\tA\tG\t.\tPASS\tVT=SNP\tGT"]);
        let err = ReferenceMapParser::new().parse(file.path()).unwrap_err();
        match err.root() {
            HarmonizerError::TooFewColumns {
                line,
                found,
                expected,
                ..
            } => {
                assert_eq!(*line, 4);
                assert_eq!(*found, 9);
                assert_eq!(*expected, 10);
            }
            other => panic!("Expected TooFewColumns, got {:?}", other),
        }

        let file = map_with_rows(&["1\t1000\trs1\tA\tG\t.\tPASS\tVT=SNP\tGT\t0|0\textra"]);
        let err = ReferenceMapParser::new().parse(file.path()).unwrap_err();
        assert!(matches!(
            err.root(),
            HarmonizerError::TooManyColumns { line: 4, found: 11, expected: 10, .. }
        ));
    }

    #[test]
    fn test_invalid_position() {
        let file = map_with_rows(&["1\t10a0\trs1\tA\tG\t.\tPASS\tVT=SNP\tGT\t0|1"]);
        let err = ReferenceMapParser::new().parse(file.path()).unwrap_err();

        match err.root() {
            HarmonizerError::InvalidPosition { value, line, path } => {
                assert_eq!(value, "10a0");
                assert_eq!(*line, 4);
                assert_eq!(path, file.path());
            }
            other => panic!("Expected InvalidPosition, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_data_line() {
        let file = map_with_rows(&["1\t1000\trs1\tA\tG\t.\tPASS\tVT=SNP\tGT\t0|1", ""]);
        let err = ReferenceMapParser::new().parse(file.path()).unwrap_err();
        assert!(matches!(err.root(), HarmonizerError::EmptyLine { line: 5, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = ReferenceMapParser::new()
            .parse("/nonexistent/reference.vcf")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
