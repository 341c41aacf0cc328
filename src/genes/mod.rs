//! Implementation of the `genes build` sub command.
//!
//! Turns per-transcript annotator output into the gene database, one
//! normalized `TranscriptOverlap` per input row and in input order.

pub mod input;
pub mod normalize;
pub mod output;

use std::time::Instant;

use clap::Parser;
use itertools::Itertools;
use rayon::prelude::*;
use thousands::Separable;

use crate::common::{
    expand_path,
    io::{tsv_reader, PendingOutput},
    schema::Header,
    trace_rss_now,
};

use self::input::AnnotationColumns;

/// Number of rows normalized in parallel before writing them out.
const CHUNK_SIZE: usize = 100_000;

/// Command line arguments for `genes build` sub command.
#[derive(Parser, Debug)]
#[command(about = "Build gene database from per-transcript annotation", long_about = None)]
pub struct Args {
    /// Path to the annotation TSV file, e.g., from VEP with `--overlaps`.
    #[arg(long)]
    pub path_input: String,
    /// Path to the output gene database TSV file.
    #[arg(long)]
    pub path_output: String,
    /// Number of threads to use for normalization.
    #[arg(long)]
    pub num_threads: Option<usize>,
}

/// Main entry point for `genes build` sub command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("Starting `genes build`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    if let Some(num_threads) = args.num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| anyhow::anyhow!("building global Rayon thread pool failed: {}", e))?;
    }

    let path_input = expand_path(&args.path_input);
    let mut reader = tsv_reader(&path_input)?;
    let header = Header::from_reader(&path_input, &mut reader)?;
    let columns = AnnotationColumns::resolve(&header)?;
    tracing::debug!("resolved columns: {:?}", &columns);

    let output = PendingOutput::new(expand_path(&args.path_output));
    let mut writer = output.tsv_writer(true)?;

    let mut count = 0usize;
    let mut with_gene = 0usize;
    let mut with_af = 0usize;
    for chunk in &reader.records().chunks(CHUNK_SIZE) {
        let records = chunk.collect::<Result<Vec<_>, _>>()?;
        let rows = records
            .par_iter()
            .map(|record| columns.normalize(&header, record))
            .collect::<Result<Vec<_>, _>>()?;

        for row in &rows {
            writer.serialize(row)?;
            if row.gene_id.is_some() {
                with_gene += 1;
            }
            if row.max_population_af().is_some() {
                with_af += 1;
            }
        }
        count += rows.len();
        tracing::debug!("... normalized {} rows", count.separate_with_commas());
    }
    output.commit(writer)?;

    trace_rss_now();
    tracing::info!(
        "wrote {} rows ({} with gene, {} with population frequency) in {:?}",
        count.separate_with_commas(),
        with_gene.separate_with_commas(),
        with_af.separate_with_commas(),
        before_anything.elapsed()
    );

    Ok(())
}
