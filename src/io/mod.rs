// ==============================================================================
// io/mod.rs - File reader/writer modules
// ==============================================================================
// Description: Line-oriented readers and writers for plain and gzip files
// Author: Matt Barham
// Created: 2025-11-14
// Modified: 2025-11-14
// Version: 1.0.0
// ==============================================================================

pub mod reader;
pub mod writer;

pub use reader::LineReader;
pub use writer::LineWriter;
