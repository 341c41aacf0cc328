//! CNV database worker main executable

pub mod cnvs;
pub mod common;
pub mod err;
pub mod genes;
pub mod loeuf;
pub mod rcnv;

use clap::{Args, Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "CNV gene overlap annotation and recurrent CNV classification",
    long_about = "This tool builds gene overlap databases for CNV call sets and flags \
                  variants matching cataloged recurrent CNVs"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Gene database related commands.
    Genes(Genes),
    /// Sample-level CNV table related commands.
    Cnvs(Cnvs),
    /// Recurrent CNV related commands.
    Rcnv(Rcnv),
    /// LOEUF related commands.
    Loeuf(Loeuf),
}

/// Parsing of "genes *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Genes {
    /// The sub command to run
    #[command(subcommand)]
    command: GenesCommands,
}

/// Enum supporting the parsing of "genes *" sub commands.
#[derive(Debug, Subcommand)]
enum GenesCommands {
    Build(genes::Args),
}

/// Parsing of "cnvs *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Cnvs {
    /// The sub command to run
    #[command(subcommand)]
    command: CnvsCommands,
}

/// Enum supporting the parsing of "cnvs *" sub commands.
#[derive(Debug, Subcommand)]
enum CnvsCommands {
    Build(cnvs::Args),
    PrepareVep(cnvs::prepare::Args),
}

/// Parsing of "rcnv *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Rcnv {
    /// The sub command to run
    #[command(subcommand)]
    command: RcnvCommands,
}

/// Enum supporting the parsing of "rcnv *" sub commands.
#[derive(Debug, Subcommand)]
enum RcnvCommands {
    Annotate(rcnv::Args),
}

/// Parsing of "loeuf *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Loeuf {
    /// The sub command to run
    #[command(subcommand)]
    command: LoeufCommands,
}

/// Enum supporting the parsing of "loeuf *" sub commands.
#[derive(Debug, Subcommand)]
enum LoeufCommands {
    Windows(loeuf::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        match &cli.command {
            Commands::Genes(genes) => match &genes.command {
                GenesCommands::Build(args) => genes::run(&cli.common, args)?,
            },
            Commands::Cnvs(cnvs) => match &cnvs.command {
                CnvsCommands::Build(args) => cnvs::run(&cli.common, args)?,
                CnvsCommands::PrepareVep(args) => cnvs::prepare::run(&cli.common, args)?,
            },
            Commands::Rcnv(rcnv) => match &rcnv.command {
                RcnvCommands::Annotate(args) => rcnv::run(&cli.common, args)?,
            },
            Commands::Loeuf(loeuf) => match &loeuf.command {
                LoeufCommands::Windows(args) => loeuf::run(&cli.common, args)?,
            },
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
