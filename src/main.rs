// ==============================================================================
// main.rs - GWAS Harmonizer Entry Point
// ==============================================================================
// Description: Command line front end for map indexing and identifier rewrite
// Author: Matt Barham
// Created: 2025-10-31
// Modified: 2025-11-20
// Version: 2.0.0
// ==============================================================================

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gwas_harmonizer::parsers::parse_separator;
use gwas_harmonizer::{HarmonizeOptions, Harmonizer, TargetColumns};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Reference map (VCF-like, plain or gzip)
    #[arg(long, env = "HARMONIZER_MAP")]
    map: PathBuf,

    /// GWAS file to harmonize
    #[arg(long, env = "HARMONIZER_INPUT")]
    input: PathBuf,

    /// Harmonized output; the log is written to <OUTPUT>.log
    #[arg(long, env = "HARMONIZER_OUTPUT")]
    output: PathBuf,

    /// Identifier column name
    #[arg(long, default_value = "MARKER")]
    id_column: String,

    /// Reference allele column name
    #[arg(long, requires = "nonref_allele_column")]
    ref_allele_column: Option<String>,

    /// Non-reference allele column name
    #[arg(long, requires = "ref_allele_column")]
    nonref_allele_column: Option<String>,

    /// Field separator: tab, comma, space, semicolon or a single character
    #[arg(long, default_value = "tab", value_parser = parse_separator)]
    separator: char,

    /// Drop rows whose identifier could not be resolved
    #[arg(long)]
    drop: bool,

    /// Gzip-compress the harmonized output
    #[arg(long)]
    gzip: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gwas_harmonizer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            for (depth, cause) in e.chain().enumerate() {
                eprintln!("{:indent$}{}", "", cause, indent = depth * 2);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    info!("GWAS harmonizer starting...");

    let mut columns = TargetColumns::new(args.id_column);
    if let (Some(ref_allele), Some(nonref_allele)) =
        (args.ref_allele_column, args.nonref_allele_column)
    {
        columns = columns.with_alleles(ref_allele, nonref_allele);
    }

    let mut harmonizer = Harmonizer::new();
    harmonizer.index_map(&args.map)?;

    let mut session = harmonizer
        .open_file(&args.input, columns, args.separator)?
        .process_header()?;

    let options = HarmonizeOptions {
        drop_unresolved: args.drop,
        gzip: args.gzip,
        checksums: args.report.is_some(),
    };
    let harmonized = harmonizer.harmonize(&mut session, &args.output, options);
    let closed = session.close();
    let report = harmonized?;
    closed?;

    info!(
        "Output written to {} (log: {})",
        report.output.display(),
        report.log.display()
    );

    if let Some(path) = &args.report {
        report.write_json(path)?;
    }

    Ok(())
}
