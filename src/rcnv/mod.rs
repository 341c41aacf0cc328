//! Implementation of the `rcnv annotate` sub command.
//!
//! Flags every variant whose exonic gene content fully contains the gene set
//! of a recurrent CNV from the catalog and counts the carrying samples per
//! recurrent CNV and type.

pub mod catalog;
pub mod extract;
pub mod freqs;
pub mod matcher;

use std::time::Instant;

use clap::Parser;
use thousands::Separable;

use crate::{
    cnvs::input::VariantColumns,
    common::{
        expand_path,
        io::{tsv_reader, PendingOutput},
        schema::Header,
        trace_rss_now, GenomeRelease,
    },
};

use self::{
    catalog::{load_catalog_from, CatalogColumns},
    extract::{load_gene_sets_from, EdgeColumns},
    freqs::count_samples,
    matcher::classify_all,
};

/// Name of the label column appended to the variant table.
const LABEL_COLUMN: &str = "rCNV_ID";

/// Command line arguments for `rcnv annotate` sub command.
#[derive(Parser, Debug)]
#[command(about = "Flag variants matching recurrent CNVs", long_about = None)]
pub struct Args {
    /// Genome release selecting the catalog gene set column.
    #[arg(long, value_enum, default_value_t = GenomeRelease::Grch38)]
    pub genome_release: GenomeRelease,
    /// Path to the gene database written by `genes build`.
    #[arg(long)]
    pub path_gene_db: String,
    /// Path to the sample-level CNV table.
    #[arg(long)]
    pub path_cnv_db: String,
    /// Path to the recurrent CNV catalog.
    #[arg(long)]
    pub path_catalog: String,
    /// Path to the output CNV table with the `rCNV_ID` column.
    #[arg(long)]
    pub path_output_flagged: String,
    /// Path to the output table with sample counts per recurrent CNV.
    #[arg(long)]
    pub path_output_counts: String,
}

/// Main entry point for `rcnv annotate` sub command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("Starting `rcnv annotate`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    // Resolve all headers before reading any rows.
    let path_gene_db = expand_path(&args.path_gene_db);
    let mut gene_db_reader = tsv_reader(&path_gene_db)?;
    let edge_columns =
        EdgeColumns::resolve(&Header::from_reader(&path_gene_db, &mut gene_db_reader)?)?;

    let path_catalog = expand_path(&args.path_catalog);
    let mut catalog_reader = tsv_reader(&path_catalog)?;
    let catalog_columns = CatalogColumns::resolve(
        &Header::from_reader(&path_catalog, &mut catalog_reader)?,
        args.genome_release,
    )?;

    let path_cnv_db = expand_path(&args.path_cnv_db);
    let mut cnv_db_reader = tsv_reader(&path_cnv_db)?;
    let variant_columns =
        VariantColumns::resolve(Header::from_reader(&path_cnv_db, &mut cnv_db_reader)?)?;

    tracing::info!("Loading catalog ...");
    let before_loading = Instant::now();
    let catalog = load_catalog_from(catalog_reader, &catalog_columns)?;
    if catalog.is_empty() {
        tracing::warn!("catalog {} has no entries, no variant will be flagged", &path_catalog);
    }
    tracing::info!(
        "... done loading {} catalog entries in {:?}",
        catalog.len().separate_with_commas(),
        before_loading.elapsed()
    );

    tracing::info!("Extracting exonic gene sets ...");
    let before_extracting = Instant::now();
    let gene_sets = load_gene_sets_from(gene_db_reader, &edge_columns)?;
    tracing::info!(
        "... done extracting gene sets of {} variants in {:?}",
        gene_sets.len().separate_with_commas(),
        before_extracting.elapsed()
    );
    trace_rss_now();

    tracing::info!("Matching against catalog ...");
    let before_matching = Instant::now();
    let matches = classify_all(&catalog, &gene_sets);
    tracing::info!(
        "... classified {} of {} variants in {:?}",
        matches.len().separate_with_commas(),
        gene_sets.len().separate_with_commas(),
        before_matching.elapsed()
    );

    tracing::info!("Writing flagged CNV table ...");
    let output_flagged = PendingOutput::new(expand_path(&args.path_output_flagged));
    let mut writer_flagged = output_flagged.tsv_writer(false)?;
    let mut names = variant_columns.header.names().to_vec();
    names.push(LABEL_COLUMN.to_string());
    writer_flagged.write_record(&names)?;

    let mut labelled = Vec::new();
    let mut count = 0usize;
    for record in cnv_db_reader.records() {
        let record = record?;
        let cnv_id = variant_columns.cnv_id(&record)?;
        let label = matches
            .get(&cnv_id)
            .map(|result| result.rcnv_id_with_type.as_str());

        let mut out = record.clone();
        out.push_field(label.unwrap_or_default());
        writer_flagged.write_record(&out)?;

        if let Some(label) = label {
            labelled.push((variant_columns.sample_id(&record).to_string(), label));
        }
        count += 1;
    }
    tracing::info!(
        "... wrote {} CNV records, {} flagged",
        count.separate_with_commas(),
        labelled.len().separate_with_commas()
    );

    tracing::info!("Writing sample counts ...");
    let rows = count_samples(
        &catalog,
        labelled
            .iter()
            .map(|(sample_id, label)| (sample_id.as_str(), *label)),
    );
    let output_counts = PendingOutput::new(expand_path(&args.path_output_counts));
    let mut writer_counts = output_counts.tsv_writer(true)?;
    for row in &rows {
        writer_counts.serialize(row)?;
    }

    output_flagged.commit(writer_flagged)?;
    output_counts.commit(writer_counts)?;

    trace_rss_now();
    tracing::info!(
        "All of `rcnv annotate` completed in {:?}",
        before_anything.elapsed()
    );

    Ok(())
}
