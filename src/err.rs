//! Error types shared by the commands.

/// Fatal problems with an input table.
///
/// These are detected while resolving the header or while reading a field
/// that the pipeline cannot continue without.  The run is aborted and no
/// output file is left behind.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{path}: missing required column {column:?} (header: {header})")]
    MissingColumn {
        path: String,
        column: String,
        header: String,
    },
    #[error("{path}: line {line}: invalid value {value:?} in column {column:?}")]
    InvalidValue {
        path: String,
        line: u64,
        column: String,
        value: String,
    },
}

/// Problems parsing a single annotation field.
///
/// Never fatal, callers resolve these to the documented null fallback.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("invalid exon position {0:?}, expected `i/n` or `a-b/n`")]
    InvalidExon(String),
    #[error("invalid overlap percentage {0:?}")]
    InvalidPercentage(String),
    #[error("invalid frequency list {0:?}")]
    InvalidFrequencies(String),
    #[error("invalid copy number list {0:?}")]
    InvalidCopyNumbers(String),
}
