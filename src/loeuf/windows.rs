//! CNV frequency statistics over windows of genes ranked by LOEUF.

use std::collections::HashMap;

use serde::Serialize;

/// A canonical gene with its LOEUF score.
#[derive(Debug, Clone, PartialEq)]
pub struct LoeufGene {
    pub gene_id: String,
    pub loeuf: f64,
}

/// One de-duplicated exonic `(SampleID, Gene_ID)` observation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneHit {
    pub sample_id: String,
    pub gene_id: String,
    /// Value of the optional overlap column.
    pub overlap: Option<f64>,
}

/// A named subset of the gene hits.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    /// Minimal overlap, `None` keeps all hits.
    pub min_overlap: Option<f64>,
}

impl Group {
    pub fn all() -> Self {
        Self {
            name: String::from("All CNVs"),
            min_overlap: None,
        }
    }

    pub fn with_min_overlap(column: &str, threshold: f64) -> Self {
        Self {
            name: format!("{} >= {}", column, threshold),
            min_overlap: Some(threshold),
        }
    }

    fn accepts(&self, hit: &GeneHit) -> bool {
        match self.min_overlap {
            None => true,
            Some(threshold) => hit.overlap.map_or(false, |overlap| overlap >= threshold),
        }
    }
}

/// Statistics of one window, one line of the output table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStats {
    pub window_id: usize,
    pub mean_loeuf: f64,
    /// Mean observations per gene per 1,000 individuals.
    pub mean_freq: f64,
    /// Sample standard deviation over `sqrt(n_genes)`, `None` for single-gene
    /// windows.
    pub sd_freq: Option<f64>,
    pub n_genes: usize,
    pub n_zero_freq: usize,
    pub group_name: String,
}

/// Genes sorted by LOEUF, ties broken by gene identifier.
pub fn rank(genes: &[LoeufGene]) -> Vec<&LoeufGene> {
    let mut result = genes.iter().collect::<Vec<_>>();
    result.sort_by(|a, b| {
        a.loeuf
            .total_cmp(&b.loeuf)
            .then_with(|| a.gene_id.cmp(&b.gene_id))
    });
    result
}

/// Compute per-window statistics of `group`.
///
/// `window` must be positive and `nb_sample` is the number of distinct
/// samples over all hits.
pub fn window_stats(
    genes: &[LoeufGene],
    hits: &[GeneHit],
    nb_sample: usize,
    window: usize,
    group: &Group,
) -> Vec<WindowStats> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for hit in hits.iter().filter(|hit| group.accepts(hit)) {
        *counts.entry(hit.gene_id.as_str()).or_default() += 1;
    }

    let scale = 1000.0 / nb_sample as f64;
    rank(genes)
        .chunks(window.max(1))
        .enumerate()
        .map(|(idx, chunk)| {
            let freqs = chunk
                .iter()
                .map(|gene| counts.get(gene.gene_id.as_str()).copied().unwrap_or_default())
                .collect::<Vec<_>>();
            let scaled = freqs
                .iter()
                .map(|freq| *freq as f64 * scale)
                .collect::<Vec<_>>();

            let n = chunk.len() as f64;
            let mean_freq = scaled.iter().sum::<f64>() / n;
            let sd_freq = (chunk.len() > 1).then(|| {
                let var = scaled
                    .iter()
                    .map(|freq| (freq - mean_freq).powi(2))
                    .sum::<f64>()
                    / (n - 1.0);
                (var / n).sqrt()
            });

            WindowStats {
                window_id: idx + 1,
                mean_loeuf: chunk.iter().map(|gene| gene.loeuf).sum::<f64>() / n,
                mean_freq,
                sd_freq,
                n_genes: chunk.len(),
                n_zero_freq: freqs.iter().filter(|freq| **freq == 0).count(),
                group_name: group.name.clone(),
            }
        })
        .collect()
}
