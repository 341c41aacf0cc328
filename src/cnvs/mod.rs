//! Implementation of the `cnvs *` subcommands on sample-level variant tables.

pub mod id;
pub mod input;
pub mod prepare;

use std::time::Instant;

use clap::Parser;
use thousands::Separable;

use crate::common::{
    expand_path,
    io::{tsv_reader, PendingOutput},
    schema::Header,
    trace_rss_now,
};

use self::input::{ClassSource, CoordColumns, CNV_ID, SAMPLE_ID};

/// Command line arguments for `cnvs build` sub command.
#[derive(Parser, Debug)]
#[command(about = "Add CNV identifiers to a sample-level CNV table", long_about = None)]
pub struct Args {
    /// Path to the input TSV file with one CNV call per line.
    #[arg(long)]
    pub path_input: String,
    /// Path to the output TSV file.
    #[arg(long)]
    pub path_output: String,
}

/// Header of the output table and the input column indices to copy.
fn output_layout(
    header: &Header,
    columns: &CoordColumns,
    sample_id: usize,
) -> (Vec<String>, Vec<usize>) {
    let skip_cnv_id = header.find(CNV_ID);
    let copied = (0..header.len())
        .filter(|idx| *idx != sample_id && Some(*idx) != skip_cnv_id)
        .collect::<Vec<_>>();

    let mut names = vec![String::from("CNV_ID"), header.names()[sample_id].clone()];
    names.extend(copied.iter().map(|idx| header.names()[*idx].clone()));
    if let ClassSource::CopyNumber(_) = columns.class {
        names.push(String::from("CN_Type"));
    }

    (names, copied)
}

/// Main entry point for `cnvs build` sub command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("Starting `cnvs build`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let path_input = expand_path(&args.path_input);
    let mut reader = tsv_reader(&path_input)?;
    let header = Header::from_reader(&path_input, &mut reader)?;
    let sample_id = header.require(SAMPLE_ID)?;
    let columns = CoordColumns::resolve(&header)?;
    tracing::debug!("resolved columns: {:?}", &columns);

    let (names, copied) = output_layout(&header, &columns, sample_id);
    let output = PendingOutput::new(expand_path(&args.path_output));
    let mut writer = output.tsv_writer(false)?;
    writer.write_record(&names)?;

    let mut count = 0usize;
    for record in reader.records() {
        let record = record?;
        let key = columns.key(&header, &record)?;

        let mut out = Vec::with_capacity(names.len());
        out.push(key.cnv_id());
        out.push(record.get(sample_id).unwrap_or_default().to_string());
        out.extend(
            copied
                .iter()
                .map(|idx| record.get(*idx).unwrap_or_default().to_string()),
        );
        if let ClassSource::CopyNumber(_) = columns.class {
            out.push(key.class.clone());
        }
        writer.write_record(&out)?;

        count += 1;
    }
    output.commit(writer)?;

    trace_rss_now();
    tracing::info!(
        "wrote {} CNV records in {:?}",
        count.separate_with_commas(),
        before_anything.elapsed()
    );

    Ok(())
}

#[cfg(test)]
mod test {
    use super::{run, Args};
    use crate::common::Args as CommonArgs;
    use temp_testdir::TempDir;

    #[test]
    fn run_smoke_type_column() -> Result<(), anyhow::Error> {
        let tmp_dir = TempDir::default();
        let args = Args {
            path_input: String::from("tests/cnvs/cnvs_type.tsv"),
            path_output: tmp_dir.join("out.tsv").to_string_lossy().into_owned(),
        };

        run(&CommonArgs::default(), &args)?;

        let output = std::fs::read_to_string(tmp_dir.join("out.tsv"))?;
        insta::assert_snapshot!(output);

        Ok(())
    }

    #[test]
    fn run_smoke_copy_number_column() -> Result<(), anyhow::Error> {
        let tmp_dir = TempDir::default();
        let args = Args {
            path_input: String::from("tests/cnvs/cnvs_copy_number.tsv"),
            path_output: tmp_dir.join("out.tsv").to_string_lossy().into_owned(),
        };

        run(&CommonArgs::default(), &args)?;

        let output = std::fs::read_to_string(tmp_dir.join("out.tsv"))?;
        insta::assert_snapshot!(output);

        Ok(())
    }

    #[test]
    fn run_missing_column() {
        let tmp_dir = TempDir::default();
        let args = Args {
            path_input: String::from("tests/cnvs/cnvs_no_end.tsv"),
            path_output: tmp_dir.join("out.tsv").to_string_lossy().into_owned(),
        };

        let err = run(&CommonArgs::default(), &args).unwrap_err();

        assert!(err.to_string().contains("missing required column \"End\""));
        assert!(!tmp_dir.join("out.tsv").exists());
    }

    #[test]
    fn run_invalid_start_leaves_no_output() -> Result<(), anyhow::Error> {
        let tmp_dir = TempDir::default();
        let args = Args {
            path_input: String::from("tests/cnvs/cnvs_bad_start.tsv"),
            path_output: tmp_dir.join("out.tsv").to_string_lossy().into_owned(),
        };

        let err = run(&CommonArgs::default(), &args).unwrap_err();

        assert!(err
            .to_string()
            .contains("line 3: invalid value \"abc\" in column \"Start\""));
        assert_eq!(std::fs::read_dir(&*tmp_dir)?.count(), 0);

        Ok(())
    }
}
