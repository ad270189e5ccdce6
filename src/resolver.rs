// ==============================================================================
// resolver.rs - Identifier Resolver
// ==============================================================================
// Description: Rewrites target identifiers into canonical chrom:pos:type form
// Author: Matt Barham
// Created: 2025-11-15
// Modified: 2025-11-20
// Version: 1.0.0
// ==============================================================================
// Identifier shapes:
//   rs12345            looked up by id, resolved only to a SNP entry
//   chr1:1000[:SNP]    looked up by position; third subtoken is a type hint
// ==============================================================================

use crate::index::ReferenceIndex;
use crate::models::{
    is_nucleotide, starts_with_ignore_case, strip_chromosome_prefix, ReferenceVariant, TypeHint,
    VariantType,
};

/// Prefix that marks an rsID-shaped identifier (case-insensitive)
pub const RSID_PREFIX: &str = "rs";

/// Separator between subtokens of a composite identifier
pub const COMPOSITE_SEPARATOR: char = ':';

/// Parsed form of a raw identifier token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierShape<'t> {
    RsId(&'t str),
    Composite {
        chromosome: &'t str,
        /// `None` when the second subtoken is absent or not purely digits
        position: Option<u64>,
        hint: Option<TypeHint>,
    },
}

impl<'t> IdentifierShape<'t> {
    pub fn parse(token: &'t str) -> Self {
        if starts_with_ignore_case(token, RSID_PREFIX) {
            return IdentifierShape::RsId(token);
        }

        let mut subtokens = token.split(COMPOSITE_SEPARATOR).take(3);
        let chromosome = strip_chromosome_prefix(subtokens.next().unwrap_or_default());
        let position = subtokens.next().and_then(parse_position);
        let hint = subtokens.next().map(TypeHint::parse);

        IdentifierShape::Composite {
            chromosome,
            position,
            hint,
        }
    }
}

fn parse_position(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Outcome of looking an identifier up in the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionStatus {
    Resolved {
        canonical: String,
        variant_type: VariantType,
    },
    NotFound,
    /// Entries exist but none has the expected type
    TypeMismatch,
}

/// Suspicious allele values for the identifier's type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlleleWarning {
    /// SNP expected but an allele is not a single A/C/G/T
    NotNucleotide,
    /// INDEL expected but an allele is a single A/C/G/T
    Nucleotide,
}

impl AlleleWarning {
    pub fn describe(&self) -> &'static str {
        match self {
            AlleleWarning::NotNucleotide => "only A/C/G/T are allowed",
            AlleleWarning::Nucleotide => "A/C/G/T are not allowed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub status: ResolutionStatus,
    pub allele_warning: Option<AlleleWarning>,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self.status, ResolutionStatus::Resolved { .. })
    }

    pub fn canonical(&self) -> Option<&str> {
        match &self.status {
            ResolutionStatus::Resolved { canonical, .. } => Some(canonical),
            _ => None,
        }
    }
}

/// What a qualifying index entry must look like
#[derive(Debug, Clone, Copy)]
enum Expected {
    Any,
    Type(VariantType),
    Hint(TypeHint),
}

impl Expected {
    fn accepts(&self, variant_type: VariantType) -> bool {
        match self {
            Expected::Any => true,
            Expected::Type(expected) => *expected == variant_type,
            Expected::Hint(hint) => hint.accepts(variant_type),
        }
    }
}

/// Read-only resolver over a built index
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a ReferenceIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a ReferenceIndex) -> Self {
        Self { index }
    }

    /// Resolve `token`, checking `alleles` (reference, non-reference) when given
    ///
    /// Allele warnings are advisory and never change the resolution status.
    pub fn resolve(&self, token: &str, alleles: Option<(&str, &str)>) -> Resolution {
        match IdentifierShape::parse(token) {
            IdentifierShape::RsId(id) => Resolution {
                status: self.resolve_rsid(id),
                allele_warning: alleles.and_then(|(r, n)| check_snp_alleles(r, n)),
            },
            IdentifierShape::Composite {
                chromosome,
                position,
                hint,
            } => {
                // With alleles, any tag other than SNP is read as an indel
                let hint = match (hint, alleles) {
                    (Some(TypeHint::Other), Some(_)) => Some(TypeHint::Indel),
                    _ => hint,
                };

                let expected = match (hint, alleles) {
                    (Some(hint), _) => Expected::Hint(hint),
                    (None, Some((r, n))) => Expected::Type(VariantType::from_alleles(r, n)),
                    (None, None) => Expected::Any,
                };

                let allele_warning = match (hint, alleles) {
                    (Some(TypeHint::Snp), Some((r, n))) => check_snp_alleles(r, n),
                    (Some(TypeHint::Indel), Some((r, n))) => check_indel_alleles(r, n),
                    _ => None,
                };

                let status = match position {
                    Some(position) => self.resolve_locus(chromosome, position, expected),
                    None => ResolutionStatus::NotFound,
                };

                Resolution {
                    status,
                    allele_warning,
                }
            }
        }
    }

    fn resolve_rsid(&self, id: &str) -> ResolutionStatus {
        let range = self.index.id_range(id);
        if range.is_empty() {
            return ResolutionStatus::NotFound;
        }

        let found = range
            .filter_map(|slot| self.index.id_location(slot))
            .filter_map(|location| self.index.variant(location))
            .find(|variant| variant.variant_type == VariantType::Snp);

        resolved_or_mismatch(found)
    }

    fn resolve_locus(
        &self,
        chromosome: &str,
        position: u64,
        expected: Expected,
    ) -> ResolutionStatus {
        let range = self.index.position_range(chromosome, position);
        if range.is_empty() {
            return ResolutionStatus::NotFound;
        }

        let found = self.index.variants()[range]
            .iter()
            .find(|variant| expected.accepts(variant.variant_type));

        resolved_or_mismatch(found)
    }
}

fn resolved_or_mismatch(found: Option<&ReferenceVariant>) -> ResolutionStatus {
    match found {
        Some(variant) => ResolutionStatus::Resolved {
            canonical: variant.canonical_id(),
            variant_type: variant.variant_type,
        },
        None => ResolutionStatus::TypeMismatch,
    }
}

fn check_snp_alleles(ref_allele: &str, nonref_allele: &str) -> Option<AlleleWarning> {
    if is_nucleotide(ref_allele) && is_nucleotide(nonref_allele) {
        None
    } else {
        Some(AlleleWarning::NotNucleotide)
    }
}

fn check_indel_alleles(ref_allele: &str, nonref_allele: &str) -> Option<AlleleWarning> {
    if is_nucleotide(ref_allele) || is_nucleotide(nonref_allele) {
        Some(AlleleWarning::Nucleotide)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(
        chromosome: &str,
        position: u64,
        id: &str,
        variant_type: VariantType,
    ) -> ReferenceVariant {
        ReferenceVariant {
            chromosome: chromosome.to_string(),
            position,
            id: id.to_string(),
            variant_type,
        }
    }

    fn sample_index() -> ReferenceIndex {
        ReferenceIndex::build(vec![
            variant("1", 1000, "rs1", VariantType::Snp),
            variant("2", 500, "rsX", VariantType::Snp),
            variant("2", 500, "rsX", VariantType::Indel),
            variant("3", 77, "rs7", VariantType::Indel),
        ])
    }

    fn resolved(canonical: &str, variant_type: VariantType) -> ResolutionStatus {
        ResolutionStatus::Resolved {
            canonical: canonical.to_string(),
            variant_type,
        }
    }

    #[test]
    fn test_shape_parse() {
        assert_eq!(IdentifierShape::parse("RS12"), IdentifierShape::RsId("RS12"));
        assert_eq!(
            IdentifierShape::parse("chr1:1000:snp"),
            IdentifierShape::Composite {
                chromosome: "1",
                position: Some(1000),
                hint: Some(TypeHint::Snp),
            }
        );
        assert_eq!(
            IdentifierShape::parse("X:12a"),
            IdentifierShape::Composite {
                chromosome: "X",
                position: None,
                hint: None,
            }
        );
        assert_eq!(
            IdentifierShape::parse("7"),
            IdentifierShape::Composite {
                chromosome: "7",
                position: None,
                hint: None,
            }
        );
    }

    #[test]
    fn test_rsid_resolves_to_snp() {
        let index = sample_index();
        let resolver = Resolver::new(&index);

        let resolution = resolver.resolve("rs1", Some(("A", "G")));
        assert_eq!(resolution.status, resolved("1:1000:SNP", VariantType::Snp));
        assert_eq!(resolution.allele_warning, None);
        assert_eq!(resolution.canonical(), Some("1:1000:SNP"));

        // Duplicate rsID: SNP entry preferred
        assert_eq!(
            resolver.resolve("RSX", None).status,
            resolved("2:500:SNP", VariantType::Snp)
        );
    }

    #[test]
    fn test_rsid_not_found_and_mismatch() {
        let index = sample_index();
        let resolver = Resolver::new(&index);

        assert_eq!(resolver.resolve("rs2", Some(("A", "T"))).status, ResolutionStatus::NotFound);
        assert_eq!(resolver.resolve("rs7", None).status, ResolutionStatus::TypeMismatch);
        assert!(!resolver.resolve("rs7", None).is_resolved());
    }

    #[test]
    fn test_rsid_allele_warning_does_not_block() {
        let index = sample_index();
        let resolution = Resolver::new(&index).resolve("rs1", Some(("A", "GT")));

        assert!(resolution.is_resolved());
        assert_eq!(resolution.allele_warning, Some(AlleleWarning::NotNucleotide));
    }

    #[test]
    fn test_composite_duplicate_disambiguation() {
        let index = sample_index();
        let resolver = Resolver::new(&index);

        let snp = resolver.resolve("2:500:SNP", Some(("A", "G")));
        assert_eq!(snp.status, resolved("2:500:SNP", VariantType::Snp));
        assert_eq!(snp.allele_warning, None);

        let indel = resolver.resolve("2:500", Some(("AT", "-")));
        assert_eq!(indel.status, resolved("2:500:INDEL", VariantType::Indel));
        assert_eq!(indel.allele_warning, None);
    }

    #[test]
    fn test_composite_hint_decides_type() {
        let index = sample_index();
        let resolver = Resolver::new(&index);

        let resolution = resolver.resolve("chr2:500:I", Some(("A", "AT")));
        assert_eq!(resolution.status, resolved("2:500:INDEL", VariantType::Indel));
        assert_eq!(resolution.allele_warning, Some(AlleleWarning::Nucleotide));

        let resolution = resolver.resolve("1:1000:INDEL", Some(("A", "G")));
        assert_eq!(resolution.status, ResolutionStatus::TypeMismatch);

        assert_eq!(
            resolver.resolve("1:1000:CNV", None).status,
            ResolutionStatus::TypeMismatch
        );
    }

    #[test]
    fn test_unknown_tag_with_alleles_expects_indel() {
        let index = sample_index();
        let resolver = Resolver::new(&index);

        let resolution = resolver.resolve("2:500:DEL", Some(("AT", "A")));
        assert_eq!(resolution.status, resolved("2:500:INDEL", VariantType::Indel));
        assert_eq!(resolution.allele_warning, Some(AlleleWarning::Nucleotide));

        let resolution = resolver.resolve("2:500:DEL", Some(("AT", "-")));
        assert_eq!(resolution.allele_warning, None);

        let resolution = resolver.resolve("1:1000:CNV", Some(("A", "G")));
        assert_eq!(resolution.status, ResolutionStatus::TypeMismatch);
    }

    #[test]
    fn test_composite_without_alleles_accepts_any_type() {
        let index = sample_index();
        let resolver = Resolver::new(&index);

        assert_eq!(
            resolver.resolve("2:500", None).status,
            resolved("2:500:SNP", VariantType::Snp)
        );
        assert_eq!(
            resolver.resolve("3:77", None).status,
            resolved("3:77:INDEL", VariantType::Indel)
        );
    }

    #[test]
    fn test_composite_not_found() {
        let index = sample_index();
        let resolver = Resolver::new(&index);

        assert_eq!(resolver.resolve("1:999", None).status, ResolutionStatus::NotFound);
        assert_eq!(resolver.resolve("1:1000x", None).status, ResolutionStatus::NotFound);
        assert_eq!(resolver.resolve("1", None).status, ResolutionStatus::NotFound);
        assert_eq!(resolver.resolve("", None).status, ResolutionStatus::NotFound);
        assert_eq!(
            resolver.resolve("1:99999999999999999999999", None).status,
            ResolutionStatus::NotFound
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let index = sample_index();
        let resolver = Resolver::new(&index);

        for token in ["rs1", "rsX", "2:500", "2:500:INDEL", "rs404"] {
            assert_eq!(
                resolver.resolve(token, Some(("A", "G"))),
                resolver.resolve(token, Some(("A", "G")))
            );
        }
    }
}
