//! Full-set matching of variant gene sets against the catalog.
//!
//! A catalog entry matches a variant when every one of its genes is
//! exonically overlapped by the variant.  Extra variant genes are allowed.
//! Of several matching entries, the one with the most genes wins; remaining
//! ties go to the smallest `rCNV_ID`.

use std::collections::BTreeMap;

use rayon::prelude::*;

use super::{
    catalog::Catalog,
    extract::{GeneSets, VariantGenes},
};

/// The surviving match of one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub cnv_id: String,
    pub rcnv_id: String,
    /// `rCNV_ID` with the lower-case variant type appended, e.g. `R1_dup`.
    pub rcnv_id_with_type: String,
    pub matched_genes: usize,
    /// Size of the variant's gene set after restricting it to catalog genes.
    pub total_genes_in_variant: usize,
    pub total_genes_in_catalog_entry: usize,
}

/// Match one variant, `None` if it stays unclassified.
pub fn match_variant(catalog: &Catalog, cnv_id: &str, variant: &VariantGenes) -> Option<MatchResult> {
    let pruned = variant
        .genes
        .iter()
        .filter(|gene| catalog.contains_gene(gene))
        .collect::<Vec<_>>();

    // Number of the variant's genes found in each entry.
    let mut matched: BTreeMap<usize, usize> = BTreeMap::new();
    for gene in &pruned {
        for idx in catalog.entries_with_gene(gene) {
            *matched.entry(*idx).or_default() += 1;
        }
    }

    let entries = catalog.entries();
    let (idx, matched_genes) = matched
        .into_iter()
        .filter(|(idx, count)| *count == entries[*idx].genes.len())
        // Indices follow `rCNV_ID` order, so the smaller index wins ties.
        .max_by(|(a_idx, a_count), (b_idx, b_count)| {
            a_count.cmp(b_count).then(b_idx.cmp(a_idx))
        })?;

    let entry = &entries[idx];
    Some(MatchResult {
        cnv_id: cnv_id.to_string(),
        rcnv_id: entry.rcnv_id.clone(),
        rcnv_id_with_type: format!("{}_{}", entry.rcnv_id, variant.cnv_type.to_lowercase()),
        matched_genes,
        total_genes_in_variant: pruned.len(),
        total_genes_in_catalog_entry: entry.genes.len(),
    })
}

/// Classify all variants in parallel, keyed by `CNV_ID`.
///
/// Only classified variants are in the result.
pub fn classify_all(catalog: &Catalog, gene_sets: &GeneSets) -> BTreeMap<String, MatchResult> {
    gene_sets
        .par_iter()
        .filter_map(|(cnv_id, variant)| match_variant(catalog, cnv_id, variant))
        .map(|result| (result.cnv_id.clone(), result))
        .collect()
}
