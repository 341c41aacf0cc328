//! Common functionality.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;
pub mod schema;

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Helper to print the current memory resident set size via `tracing`.
pub fn trace_rss_now() {
    let rss = procfs::process::Process::myself()
        .and_then(|me| me.stat())
        .map(|stat| stat.rss * procfs::page_size());
    match rss {
        Ok(rss) => tracing::debug!("RSS now: {}", bytesize::ByteSize(rss)),
        Err(e) => tracing::debug!("could not determine RSS: {}", e),
    }
}

/// Select the genome release to use.
#[derive(
    clap::ValueEnum,
    Clone,
    Copy,
    Debug,
    Default,
    strum::Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
pub enum GenomeRelease {
    /// GRCh37 / hg19
    #[strum(serialize = "grch37")]
    Grch37,
    /// GRCh38 / hg38
    #[default]
    #[strum(serialize = "grch38")]
    Grch38,
}

impl GenomeRelease {
    pub fn name(&self) -> String {
        match self {
            GenomeRelease::Grch37 => String::from("GRCh37"),
            GenomeRelease::Grch38 => String::from("GRCh38"),
        }
    }

    /// Name of the recurrent CNV catalog column holding the gene sets.
    pub fn geneset_column(&self) -> String {
        format!("geneset_{}", self.name())
    }
}

impl std::str::FromStr for GenomeRelease {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_ascii_lowercase();
        if s.starts_with("grch37") {
            Ok(GenomeRelease::Grch37)
        } else if s.starts_with("grch38") {
            Ok(GenomeRelease::Grch38)
        } else {
            Err(anyhow::anyhow!("Unknown genome release: {}", s))
        }
    }
}

/// Expand `~` in a path given on the command line.
pub fn expand_path(path: &str) -> String {
    shellexpand::tilde(path).into_owned()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::GenomeRelease;

    #[test]
    fn trace_rss_now_smoke() {
        super::trace_rss_now();
    }

    #[rstest::rstest]
    #[case(GenomeRelease::Grch37, "GRCh37")]
    #[case(GenomeRelease::Grch38, "GRCh38")]
    fn genome_release_name(#[case] release: GenomeRelease, #[case] expected: &str) {
        assert_eq!(expected, release.name());
    }

    #[rstest::rstest]
    #[case(GenomeRelease::Grch37, "geneset_GRCh37")]
    #[case(GenomeRelease::Grch38, "geneset_GRCh38")]
    fn genome_release_geneset_column(
        #[case] release: GenomeRelease,
        #[case] expected: &str,
    ) {
        assert_eq!(expected, release.geneset_column());
    }

    #[rstest::rstest]
    #[case(GenomeRelease::Grch37, "grch37")]
    #[case(GenomeRelease::Grch37, "GRCh37")]
    #[case(GenomeRelease::Grch38, "GRCh38")]
    fn genome_release_from_str(
        #[case] release: GenomeRelease,
        #[case] s: &str,
    ) -> Result<(), anyhow::Error> {
        let res: GenomeRelease = s.parse()?;

        assert_eq!(res, release);

        Ok(())
    }

    #[test]
    fn genome_release_from_str_unknown() {
        assert!("hg18".parse::<GenomeRelease>().is_err());
    }
}
