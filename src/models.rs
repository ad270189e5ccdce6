// ==============================================================================
// models.rs - Reference Map Data Models
// ==============================================================================
// Description: Variant records, type tags and identifier helpers
// Author: Matt Barham
// Created: 2025-11-12
// Modified: 2025-11-20
// Version: 3.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Variant type tag written into canonical identifiers for SNPs
pub const SNP_TAG: &str = "SNP";

/// Variant type tag written into canonical identifiers for indels
pub const INDEL_TAG: &str = "INDEL";

/// Short indel alias accepted in composite identifiers
pub const INDEL_ALIAS_TAG: &str = "I";

/// Variant type recorded in the reference map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantType {
    Snp,
    Indel,
}

impl VariantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantType::Snp => SNP_TAG,
            VariantType::Indel => INDEL_TAG,
        }
    }

    /// Type implied by a target row's allele pair
    ///
    /// Two single-nucleotide alleles (A/C/G/T, any case) imply a SNP,
    /// anything else an indel.
    pub fn from_alleles(ref_allele: &str, nonref_allele: &str) -> Self {
        if is_nucleotide(ref_allele) && is_nucleotide(nonref_allele) {
            VariantType::Snp
        } else {
            VariantType::Indel
        }
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type tag parsed from the third subtoken of a composite identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    Snp,
    Indel,
    /// Present but neither a SNP nor an indel tag
    Other,
}

impl TypeHint {
    pub fn parse(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case(SNP_TAG) {
            TypeHint::Snp
        } else if tag.eq_ignore_ascii_case(INDEL_TAG) || tag.eq_ignore_ascii_case(INDEL_ALIAS_TAG) {
            TypeHint::Indel
        } else {
            TypeHint::Other
        }
    }

    /// Whether a reference entry of type `variant_type` satisfies this hint
    pub fn accepts(&self, variant_type: VariantType) -> bool {
        matches!(
            (self, variant_type),
            (TypeHint::Snp, VariantType::Snp) | (TypeHint::Indel, VariantType::Indel)
        )
    }
}

/// One data row of the reference map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceVariant {
    /// Chromosome name as it appears in canonical identifiers (e.g., "1", "X")
    pub chromosome: String,

    /// Base pair position
    pub position: u64,

    /// Reference identifier, typically an rsID
    pub id: String,

    /// SNP if the INFO field declares `VT=SNP`, otherwise INDEL
    pub variant_type: VariantType,
}

impl ReferenceVariant {
    /// Canonical `chromosome:position:type` identifier
    pub fn canonical_id(&self) -> String {
        format!("{}:{}:{}", self.chromosome, self.position, self.variant_type)
    }

    /// Position index ordering: position first, then chromosome ignoring case
    pub fn locus_cmp(&self, chromosome: &str, position: u64) -> Ordering {
        self.position
            .cmp(&position)
            .then_with(|| cmp_ignore_case(&self.chromosome, chromosome))
    }
}

/// Byte-wise comparison after ASCII lowercasing
pub fn cmp_ignore_case(first: &str, second: &str) -> Ordering {
    first
        .bytes()
        .map(|b| b.to_ascii_lowercase())
        .cmp(second.bytes().map(|b| b.to_ascii_lowercase()))
}

/// Case-insensitive ASCII prefix test
pub fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len()
        && value.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Remove a leading `chr` (any case) from a chromosome name
pub fn strip_chromosome_prefix(chromosome: &str) -> &str {
    if starts_with_ignore_case(chromosome, "chr") {
        &chromosome[3..]
    } else {
        chromosome
    }
}

/// Exactly one of A/C/G/T, case-insensitive
pub fn is_nucleotide(allele: &str) -> bool {
    matches!(allele.as_bytes(), [b'A' | b'C' | b'G' | b'T' | b'a' | b'c' | b'g' | b't'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_type_from_alleles() {
        assert_eq!(VariantType::from_alleles("A", "g"), VariantType::Snp);
        assert_eq!(VariantType::from_alleles("A", "AT"), VariantType::Indel);
        assert_eq!(VariantType::from_alleles("-", "T"), VariantType::Indel);
        assert_eq!(VariantType::from_alleles("N", "T"), VariantType::Indel);
    }

    #[test]
    fn test_type_hint_parse() {
        assert_eq!(TypeHint::parse("snp"), TypeHint::Snp);
        assert_eq!(TypeHint::parse("INDEL"), TypeHint::Indel);
        assert_eq!(TypeHint::parse("i"), TypeHint::Indel);
        assert_eq!(TypeHint::parse("CNV"), TypeHint::Other);

        assert!(TypeHint::Snp.accepts(VariantType::Snp));
        assert!(!TypeHint::Snp.accepts(VariantType::Indel));
        assert!(!TypeHint::Other.accepts(VariantType::Snp));
        assert!(!TypeHint::Other.accepts(VariantType::Indel));
    }

    #[test]
    fn test_canonical_id() {
        let variant = ReferenceVariant {
            chromosome: "1".to_string(),
            position: 1000,
            id: "rs1".to_string(),
            variant_type: VariantType::Snp,
        };
        assert_eq!(variant.canonical_id(), "1:1000:SNP");

        let indel = ReferenceVariant {
            variant_type: VariantType::Indel,
            ..variant
        };
        assert_eq!(indel.canonical_id(), "1:1000:INDEL");
    }

    #[test]
    fn test_cmp_ignore_case() {
        assert_eq!(cmp_ignore_case("X", "x"), Ordering::Equal);
        assert_eq!(cmp_ignore_case("rs10", "RS2"), Ordering::Less);
        assert_eq!(cmp_ignore_case("1", "10"), Ordering::Less);
        assert_eq!(cmp_ignore_case("Y", "x"), Ordering::Greater);
    }

    #[test]
    fn test_locus_ordering() {
        let variant = ReferenceVariant {
            chromosome: "2".to_string(),
            position: 500,
            id: "rsX".to_string(),
            variant_type: VariantType::Snp,
        };
        assert_eq!(variant.locus_cmp("2", 500), Ordering::Equal);
        assert_eq!(variant.locus_cmp("1", 500), Ordering::Greater);
        assert_eq!(variant.locus_cmp("1", 501), Ordering::Less);
    }

    #[test]
    fn test_prefix_helpers() {
        assert!(starts_with_ignore_case("RS123", "rs"));
        assert!(!starts_with_ignore_case("r", "rs"));
        assert_eq!(strip_chromosome_prefix("chr7"), "7");
        assert_eq!(strip_chromosome_prefix("CHRX"), "X");
        assert_eq!(strip_chromosome_prefix("7"), "7");
    }

    #[test]
    fn test_is_nucleotide() {
        for allele in ["A", "c", "G", "t"] {
            assert!(is_nucleotide(allele));
        }
        for allele in ["", "AT", "N", "-", "0"] {
            assert!(!is_nucleotide(allele));
        }
    }
}
