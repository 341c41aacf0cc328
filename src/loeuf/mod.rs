//! Implementation of the `loeuf windows` sub command.
//!
//! Relates gene constraint (LOEUF) to how often genes are exonically hit by
//! CNVs: genes are ranked by LOEUF, bucketed into windows, and per window the
//! mean number of observations per 1,000 individuals is reported.

pub mod windows;

use std::collections::{BTreeSet, HashSet};
use std::time::Instant;

use clap::Parser;
use thousands::Separable;

use crate::common::{
    expand_path,
    io::{tsv_reader, PendingOutput},
    schema::Header,
    trace_rss_now,
};

use self::windows::{window_stats, GeneHit, Group, LoeufGene};

/// Command line arguments for `loeuf windows` sub command.
#[derive(Parser, Debug)]
#[command(about = "Compute CNV frequency statistics over LOEUF windows", long_about = None)]
pub struct Args {
    /// Path to the LOEUF table (gnomAD constraint metrics).
    #[arg(long)]
    pub path_loeuf: String,
    /// Path to the gene-level CNV table with `SampleID`, `Gene_ID`, and
    /// `Exon_Overlap`.
    #[arg(long)]
    pub path_cnv: String,
    /// Path to the output TSV file with one line per window and group.
    #[arg(long)]
    pub path_output: String,
    /// Number of genes per window.
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..))]
    pub window: u32,
    /// Overlap column for the additional filtered group.
    #[arg(long)]
    pub overlap_column: Option<String>,
    /// Minimal value in the overlap column for the filtered group.
    #[arg(long, default_value_t = 0.5)]
    pub threshold: f64,
}

const LOEUF_GENE_ID: &str = "gene_id";
const LOEUF_CANONICAL: &str = "canonical";
const LOEUF_MANE_SELECT: &str = "mane_select";
const LOEUF_UPPER: &str = "lof.oe_ci.upper";

/// Load canonical Ensembl genes with a numeric LOEUF.
fn load_loeuf(path: &str) -> Result<Vec<LoeufGene>, anyhow::Error> {
    let mut reader = tsv_reader(path)?;
    let header = Header::from_reader(path, &mut reader)?;
    let gene_id = header.require(&[LOEUF_GENE_ID])?;
    let canonical = header.require(&[LOEUF_CANONICAL])?;
    header.require(&[LOEUF_MANE_SELECT])?;
    let upper = header.require(&[LOEUF_UPPER])?;

    let mut result = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or_default().trim();
        if !field(canonical).eq_ignore_ascii_case("true") || !field(gene_id).starts_with("ENS") {
            continue;
        }
        match field(upper).parse::<f64>() {
            Ok(loeuf) if !loeuf.is_nan() => result.push(LoeufGene {
                gene_id: field(gene_id).to_string(),
                loeuf,
            }),
            _ => tracing::trace!("skipping {} without LOEUF", field(gene_id)),
        }
    }

    Ok(result)
}

/// Load exonic CNV hits, one per `(SampleID, Gene_ID)`, keeping the first.
///
/// Returns the hits and whether the overlap column was present.
fn load_hits(
    path: &str,
    overlap_column: Option<&str>,
) -> Result<(Vec<GeneHit>, bool), anyhow::Error> {
    let mut reader = tsv_reader(path)?;
    let header = Header::from_reader(path, &mut reader)?;
    let sample_id = header.require(&["SampleID"])?;
    let gene_id = header.require(&["Gene_ID"])?;
    let exon_overlap = header.require(&["Exon_Overlap"])?;
    let overlap = overlap_column.and_then(|column| header.find(&[column]));

    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or_default().trim();
        let number = |idx: usize| field(idx).parse::<f64>().ok();

        if !number(exon_overlap).map_or(false, |value| value > 0.0) {
            continue;
        }
        let hit = GeneHit {
            sample_id: field(sample_id).to_string(),
            gene_id: field(gene_id).to_string(),
            overlap: overlap.and_then(number),
        };
        if seen.insert((hit.sample_id.clone(), hit.gene_id.clone())) {
            result.push(hit);
        }
    }

    Ok((result, overlap.is_some()))
}

/// Main entry point for `loeuf windows` sub command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("Starting `loeuf windows`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let genes = load_loeuf(&expand_path(&args.path_loeuf))?;
    tracing::info!("loaded {} LOEUF genes", genes.len().separate_with_commas());

    let (hits, has_overlap) =
        load_hits(&expand_path(&args.path_cnv), args.overlap_column.as_deref())?;
    let nb_sample = hits
        .iter()
        .map(|hit| hit.sample_id.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    if nb_sample == 0 {
        anyhow::bail!("no sample with exonic CNV in {}", &args.path_cnv);
    }
    tracing::info!(
        "loaded {} exonic gene hits of {} samples",
        hits.len().separate_with_commas(),
        nb_sample.separate_with_commas()
    );
    trace_rss_now();

    let mut groups = vec![Group::all()];
    match (&args.overlap_column, has_overlap) {
        (Some(column), true) => groups.push(Group::with_min_overlap(column, args.threshold)),
        (Some(column), false) => {
            tracing::warn!("overlap column {} not found in {}", column, &args.path_cnv)
        }
        (None, _) => (),
    }

    let output = PendingOutput::new(expand_path(&args.path_output));
    let mut writer = output.tsv_writer(true)?;
    for group in &groups {
        let stats = window_stats(&genes, &hits, nb_sample, args.window as usize, group);
        tracing::debug!("{} windows for group {}", stats.len(), &group.name);
        for row in &stats {
            writer.serialize(row)?;
        }
    }
    output.commit(writer)?;

    tracing::info!(
        "All of `loeuf windows` completed in {:?}",
        before_anything.elapsed()
    );

    Ok(())
}
