//! Implementation of `cnvs prepare-vep`.
//!
//! Writes the unique CNV regions of a sample-level table in the five-column
//! structural variant input format understood by VEP.

use std::{collections::BTreeSet, time::Instant};

use clap::Parser;
use thousands::Separable;

use crate::common::{
    expand_path,
    io::{tsv_reader, PendingOutput},
    schema::Header,
};

use super::input::{CoordColumns, VariantKey};

/// Strand column value, CNV calls are unstranded.
const STRAND: &str = ".";

/// Command line arguments for `cnvs prepare-vep` sub command.
#[derive(Parser, Debug)]
#[command(about = "Prepare unique CNV regions for VEP annotation", long_about = None)]
pub struct Args {
    /// Path to the input TSV file with one CNV call per line.
    #[arg(long)]
    pub path_input: String,
    /// Path to the output file (no header).
    #[arg(long)]
    pub path_output: String,
}

/// Collect the unique variant keys of all rows, sorted by chromosome name,
/// start, end, and class.
fn unique_regions<R: std::io::Read>(
    header: &Header,
    columns: &CoordColumns,
    reader: &mut csv::Reader<R>,
) -> Result<BTreeSet<VariantKey>, anyhow::Error> {
    let mut result = BTreeSet::new();
    for record in reader.records() {
        result.insert(columns.key(header, &record?)?);
    }
    Ok(result)
}

/// Main entry point for `cnvs prepare-vep` sub command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("Starting `cnvs prepare-vep`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let path_input = expand_path(&args.path_input);
    let mut reader = tsv_reader(&path_input)?;
    let header = Header::from_reader(&path_input, &mut reader)?;
    let columns = CoordColumns::resolve(&header)?;

    let regions = unique_regions(&header, &columns, &mut reader)?;

    let output = PendingOutput::new(expand_path(&args.path_output));
    let mut writer = output.tsv_writer(false)?;
    for key in &regions {
        let start = key.start.to_string();
        let end = key.end.to_string();
        writer.write_record([
            key.chrom.as_str(),
            start.as_str(),
            end.as_str(),
            key.class.as_str(),
            STRAND,
        ])?;
    }
    output.commit(writer)?;

    tracing::info!(
        "wrote {} unique regions in {:?}",
        regions.len().separate_with_commas(),
        before_anything.elapsed()
    );

    Ok(())
}
