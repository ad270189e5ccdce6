// ==============================================================================
// index.rs - Reference Map Indices
// ==============================================================================
// Description: Sorted position and identifier indices over the reference map
// Author: Matt Barham
// Created: 2025-11-14
// Modified: 2025-11-20
// Version: 1.0.0
// ==============================================================================
// The position index owns the variants, ordered by (position, chromosome).
// The id index holds offsets into the position index, ordered by identifier.
// All comparisons ignore ASCII case. Lookups return the full equality range.
// ==============================================================================

use serde::Serialize;
use std::cmp::Ordering;
use std::ops::Range;

use crate::models::{cmp_ignore_case, ReferenceVariant, VariantType};

/// Summary of a built index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub variants: usize,
    pub snps: usize,
    pub indels: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    /// Position index: variants sorted by (position, chromosome)
    variants: Vec<ReferenceVariant>,

    /// Id index: offsets into `variants`, sorted by id
    id_index: Vec<usize>,
}

impl ReferenceIndex {
    /// Build both indices
    ///
    /// Both sorts are stable, so entries with equal keys keep map file order.
    pub fn build(mut variants: Vec<ReferenceVariant>) -> Self {
        variants.sort_by(|a, b| a.locus_cmp(&b.chromosome, b.position));

        let mut id_index: Vec<usize> = (0..variants.len()).collect();
        id_index.sort_by(|&a, &b| cmp_ignore_case(&variants[a].id, &variants[b].id));

        Self { variants, id_index }
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Variant at `location` in the position index
    pub fn variant(&self, location: usize) -> Option<&ReferenceVariant> {
        self.variants.get(location)
    }

    /// Position index entries, in index order
    pub fn variants(&self) -> &[ReferenceVariant] {
        &self.variants
    }

    /// Position index location referenced by id index slot `slot`
    pub fn id_location(&self, slot: usize) -> Option<usize> {
        self.id_index.get(slot).copied()
    }

    /// Range of position index entries at `chromosome:position`
    pub fn position_range(&self, chromosome: &str, position: u64) -> Range<usize> {
        equal_range(&self.variants, |variant| variant.locus_cmp(chromosome, position))
    }

    /// Range of id index slots whose identifier equals `id`
    pub fn id_range(&self, id: &str) -> Range<usize> {
        equal_range(&self.id_index, |&location| {
            cmp_ignore_case(&self.variants[location].id, id)
        })
    }

    pub fn stats(&self) -> IndexStats {
        let snps = self
            .variants
            .iter()
            .filter(|variant| variant.variant_type == VariantType::Snp)
            .count();

        IndexStats {
            variants: self.variants.len(),
            snps,
            indels: self.variants.len() - snps,
        }
    }
}

/// Find one matching element by binary search, then widen to every neighbour
/// that compares equal. Returns an empty range when nothing matches.
fn equal_range<T>(items: &[T], cmp: impl Fn(&T) -> Ordering) -> Range<usize> {
    let found = match items.binary_search_by(&cmp) {
        Ok(found) => found,
        Err(_) => return 0..0,
    };

    let mut start = found;
    while start > 0 && cmp(&items[start - 1]) == Ordering::Equal {
        start -= 1;
    }

    let mut end = found + 1;
    while end < items.len() && cmp(&items[end]) == Ordering::Equal {
        end += 1;
    }

    start..end
}
