// ==============================================================================
// harmonizer.rs - Harmonization Engine
// ==============================================================================
// Description: Map indexing, target session lifecycle and row streaming
// Author: Matt Barham
// Created: 2025-11-15
// Modified: 2025-11-20
// Version: 1.1.0
// ==============================================================================
// Lifecycle:
//   index_map(map)                      build position and id indices
//   open_file(target) -> TargetFile
//   TargetFile::process_header()        -> TargetFileSession (column layout)
//   harmonize(&mut session, output)     rewrite ids, write output + .log
//   TargetFileSession::close()
// ==============================================================================

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::audit::{AuditEvent, AuditLog};
use crate::error::{HarmonizerError, Result, WithContext};
use crate::index::{IndexStats, ReferenceIndex};
use crate::io::{LineReader, LineWriter};
use crate::parsers::reference::ReferenceMapParser;
use crate::parsers::target::{split_fields, TargetColumns, TargetLayout};
use crate::report::{HarmonizeReport, InputFile, RowCounts};
use crate::resolver::{ResolutionStatus, Resolver};
use crate::validator::{log_path_for, require_path, Compression};

/// Per-call harmonization switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarmonizeOptions {
    /// Omit unresolved rows from the primary output (allele columns required)
    pub drop_unresolved: bool,

    /// Gzip-compress the primary output; the companion log stays plain text
    pub gzip: bool,

    /// Record SHA-256 checksums of the map and target in the report
    pub checksums: bool,
}

/// Owner of the reference indices
#[derive(Debug, Default)]
pub struct Harmonizer {
    index: Option<ReferenceIndex>,
    map_path: Option<PathBuf>,
}

impl Harmonizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the reference map and (re)build both indices
    ///
    /// Any previous index is discarded first, so a failed rebuild leaves the
    /// harmonizer without an index.
    pub fn index_map(&mut self, path: impl AsRef<Path>) -> Result<IndexStats> {
        let path = path.as_ref();
        require_path("map_file_name", path).context("Harmonizer", "index_map")?;

        self.index = None;
        self.map_path = None;

        let variants = ReferenceMapParser::new()
            .parse(path)
            .context("Harmonizer", "index_map")?;
        let index = ReferenceIndex::build(variants);
        let stats = index.stats();

        info!(
            "Indexed {} map variants ({} SNPs, {} INDELs)",
            stats.variants, stats.snps, stats.indels
        );

        self.index = Some(index);
        self.map_path = Some(path.to_path_buf());
        Ok(stats)
    }

    pub fn index(&self) -> Option<&ReferenceIndex> {
        self.index.as_ref()
    }

    /// Open a target file; call `process_header` on the result
    ///
    /// `separator` must be a single ASCII character.
    pub fn open_file(
        &self,
        path: impl AsRef<Path>,
        columns: TargetColumns,
        separator: char,
    ) -> Result<TargetFile> {
        let path = path.as_ref();
        require_path("file_name", path).context("Harmonizer", "open_file")?;
        columns.validate().context("Harmonizer", "open_file")?;
        if !separator.is_ascii() {
            return Err(HarmonizerError::InvalidArgument("separator"))
                .context("Harmonizer", "open_file");
        }

        let reader = LineReader::open(path).context("Harmonizer", "open_file")?;
        debug!("Opened target file {} ({:?})", path.display(), reader.compression());

        Ok(TargetFile {
            reader,
            columns,
            separator: separator as u8,
        })
    }

    /// Stream the session's target file into `output` and `<output>.log`
    ///
    /// The target is rewound first, so a session can be harmonized more than
    /// once. On a fatal row error both writers are closed and whatever was
    /// already written stays on disk.
    pub fn harmonize(
        &self,
        session: &mut TargetFileSession,
        output: impl AsRef<Path>,
        options: HarmonizeOptions,
    ) -> Result<HarmonizeReport> {
        let output = output.as_ref();
        require_path("output_file_name", output).context("Harmonizer", "harmonize")?;

        let (index, map_path) = match (&self.index, &self.map_path) {
            (Some(index), Some(map_path)) => (index, map_path),
            _ => return Err(HarmonizerError::MapNotIndexed).context("Harmonizer", "harmonize"),
        };

        let drop_unresolved = options.drop_unresolved && session.layout.has_alleles();
        if options.drop_unresolved && !drop_unresolved {
            warn!("Drop mode needs allele columns; unresolved rows will be kept");
        }

        let compression = if options.gzip {
            Compression::Gzip
        } else {
            Compression::Plain
        };
        let log_path = log_path_for(output);

        let mut writer =
            LineWriter::create(output, compression).context("Harmonizer", "harmonize")?;
        let mut log = match AuditLog::create(&log_path) {
            Ok(log) => log,
            Err(e) => {
                if let Err(close_error) = writer.close() {
                    warn!("Failed to close {}: {}", output.display(), close_error);
                }
                return Err(e).context("Harmonizer", "harmonize");
            }
        };

        let streamed = stream_rows(
            Resolver::new(index),
            session,
            &mut writer,
            &mut log,
            drop_unresolved,
        );
        let writer_closed = writer.close();
        let log_closed = log.close();

        let rows = streamed.context("Harmonizer", "harmonize")?;
        writer_closed.context("Harmonizer", "harmonize")?;
        log_closed.context("Harmonizer", "harmonize")?;

        let events = log.tallies();
        info!(
            "Harmonized {} rows: {} written, {} dropped, {} changed, {} warnings",
            rows.read,
            rows.written,
            rows.dropped,
            events.changed,
            events.warnings()
        );

        Ok(HarmonizeReport {
            generated_at: chrono::Utc::now(),
            map: InputFile::describe(map_path, options.checksums)
                .context("Harmonizer", "harmonize")?,
            input: InputFile::describe(session.path(), options.checksums)
                .context("Harmonizer", "harmonize")?,
            output: output.to_path_buf(),
            log: log_path,
            with_alleles: session.layout.has_alleles(),
            drop_unresolved,
            rows,
            events,
            index: index.stats(),
        })
    }
}

fn stream_rows(
    resolver: Resolver<'_>,
    session: &mut TargetFileSession,
    writer: &mut LineWriter,
    log: &mut AuditLog,
    drop_unresolved: bool,
) -> Result<RowCounts> {
    let path = session.reader.path().to_path_buf();
    let layout = &session.layout;
    let reader = &mut session.reader;

    reader.reset()?;
    reader.read_line()?;
    writer.write_bytes(&layout.header)?;
    writer.write_bytes(b"\n")?;

    let mut counts = RowCounts::default();
    let mut line_number = 1u64;
    let mut row: Vec<u8> = Vec::new();

    while let Some(line) = reader.read_line()? {
        line_number += 1;

        if line.is_empty() {
            return Err(HarmonizerError::EmptyLine {
                path,
                line: line_number,
            });
        }

        let fields: Vec<&[u8]> = split_fields(line, layout.separator).collect();
        if fields.len() < layout.column_count {
            return Err(HarmonizerError::TooFewColumns {
                path,
                line: line_number,
                found: fields.len(),
                expected: layout.column_count,
            });
        }
        if fields.len() > layout.column_count {
            return Err(HarmonizerError::TooManyColumns {
                path,
                line: line_number,
                found: fields.len(),
                expected: layout.column_count,
            });
        }
        counts.read += 1;

        // Only the id and allele fields are decoded; all others stay raw bytes
        let raw_identifier = fields[layout.id_position];
        let identifier = String::from_utf8_lossy(raw_identifier);
        let allele_text = layout
            .allele_positions
            .map(|(r, n)| (String::from_utf8_lossy(fields[r]), String::from_utf8_lossy(fields[n])));
        let alleles = allele_text.as_ref().map(|(r, n)| (r.trim(), n.trim()));
        let resolution = resolver.resolve(&identifier, alleles);

        if let Some(warning) = resolution.allele_warning {
            log.record(&AuditEvent::incorrect_alleles(line_number, &identifier, warning))?;
        }
        match &resolution.status {
            ResolutionStatus::Resolved { canonical, .. } => {
                if canonical.as_bytes() != raw_identifier {
                    log.record(&AuditEvent::changed(line_number, &identifier, canonical))?;
                }
            }
            ResolutionStatus::NotFound => {
                log.record(&AuditEvent::not_found(line_number, &identifier))?
            }
            ResolutionStatus::TypeMismatch => {
                log.record(&AuditEvent::type_mismatch(line_number, &identifier))?
            }
        }

        if drop_unresolved && !resolution.is_resolved() {
            counts.dropped += 1;
            continue;
        }

        let replacement = match resolution.canonical() {
            Some(canonical) => canonical.as_bytes(),
            None => raw_identifier,
        };
        row.clear();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                row.push(layout.separator);
            }
            row.extend_from_slice(if i == layout.id_position { replacement } else { *field });
        }
        row.push(b'\n');
        writer.write_bytes(&row)?;
        counts.written += 1;
    }

    Ok(counts)
}

/// An opened target file whose header has not been read yet
#[derive(Debug)]
pub struct TargetFile {
    reader: LineReader,
    columns: TargetColumns,
    separator: u8,
}

impl TargetFile {
    /// Read the header line and locate the configured columns
    ///
    /// The file is closed if the header is missing or incomplete.
    pub fn process_header(mut self) -> Result<TargetFileSession> {
        match self.read_layout() {
            Ok(layout) => Ok(TargetFileSession {
                reader: self.reader,
                layout,
            }),
            Err(e) => {
                if let Err(close_error) = self.reader.close() {
                    warn!("Failed to close {}: {}", self.reader.path().display(), close_error);
                }
                Err(e).context("TargetFile", "process_header")
            }
        }
    }

    fn read_layout(&mut self) -> Result<TargetLayout> {
        let path = self.reader.path().to_path_buf();

        let header = match self.reader.read_line()? {
            Some(line) if !line.is_empty() => line.to_vec(),
            _ => return Err(HarmonizerError::MissingHeader { path, line: 1 }),
        };

        let layout = TargetLayout::from_header(&header, &self.columns, self.separator, &path)?;
        info!(
            "Target header: {} columns, id column {}, allele columns {:?}",
            layout.column_count, layout.id_position, layout.allele_positions
        );
        Ok(layout)
    }
}

/// Target file with a discovered column layout, ready for `harmonize`
#[derive(Debug)]
pub struct TargetFileSession {
    reader: LineReader,
    layout: TargetLayout,
}

impl TargetFileSession {
    pub fn layout(&self) -> &TargetLayout {
        &self.layout
    }

    pub fn path(&self) -> &Path {
        self.reader.path()
    }

    pub fn close(mut self) -> Result<()> {
        self.reader.close().context("TargetFileSession", "close")
    }
}
