// ==============================================================================
// parsers/mod.rs - File parser modules
// ==============================================================================
// Description: Parsers for the reference map and target GWAS headers
// Author: Matt Barham
// Created: 2025-11-03
// Modified: 2025-11-20
// Version: 2.0.0
// ==============================================================================

pub mod reference;
pub mod target;

pub use reference::ReferenceMapParser;
pub use target::{parse_separator, AlleleColumns, TargetColumns, TargetLayout};
