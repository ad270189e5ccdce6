// ==============================================================================
// lib.rs - GWAS Harmonizer Library
// ==============================================================================
// Description: Library interface for identifier harmonization modules
// Author: Matt Barham
// Created: 2025-11-03
// Modified: 2025-11-20
// Version: 2.0.0
// ==============================================================================

pub mod error;
pub mod models;
pub mod validator;
pub mod io;
pub mod parsers;
pub mod index;
pub mod resolver;
pub mod audit;
pub mod report;
pub mod harmonizer;

pub use error::{ErrorKind, HarmonizerError, Result};
pub use harmonizer::{HarmonizeOptions, Harmonizer, TargetFile, TargetFileSession};
pub use parsers::{TargetColumns, TargetLayout};
pub use report::HarmonizeReport;
