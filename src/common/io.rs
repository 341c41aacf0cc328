//! Common, IO-related code.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use flate2::{bufread::MultiGzDecoder, write::GzEncoder, Compression};

/// Transparently open a file with gzip decoder.
pub fn open_read_maybe_gz<P>(path: P) -> Result<Box<dyn BufRead>, anyhow::Error>
where
    P: AsRef<Path>,
{
    if path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz")) {
        tracing::trace!("Opening {:?} as gzip for reading", path.as_ref());
        let file = File::open(path)?;
        let bufreader = BufReader::new(file);
        let decoder = MultiGzDecoder::new(bufreader);
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        tracing::trace!("Opening {:?} as plain text for reading", path.as_ref());
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Transparently open a file with gzip encoder.
pub fn open_write_maybe_gz<P>(path: P) -> Result<Box<dyn Write>, anyhow::Error>
where
    P: AsRef<Path>,
{
    if path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz")) {
        tracing::trace!("Opening {:?} as gzip for writing", path.as_ref());
        let file = File::create(path)?;
        let bufwriter = BufWriter::new(file);
        let encoder = GzEncoder::new(bufwriter, Compression::default());
        Ok(Box::new(encoder))
    } else {
        tracing::trace!("Opening {:?} as plain text for writing", path.as_ref());
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// Open a tab-separated table with a header line for reading.
pub fn tsv_reader<P>(path: P) -> Result<csv::Reader<Box<dyn BufRead>>, anyhow::Error>
where
    P: AsRef<Path>,
{
    let reader = open_read_maybe_gz(path.as_ref()).map_err(|e| {
        anyhow::anyhow!("could not open {:?} for reading: {}", path.as_ref(), e)
    })?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader))
}

/// Open a tab-separated table for writing.
///
/// The header line is written by the caller (or by `serialize()` for typed
/// rows) unless `has_headers` is `false`.
pub fn tsv_writer<P>(
    path: P,
    has_headers: bool,
) -> Result<csv::Writer<Box<dyn Write>>, anyhow::Error>
where
    P: AsRef<Path>,
{
    let writer = open_write_maybe_gz(path.as_ref()).map_err(|e| {
        anyhow::anyhow!("could not open {:?} for writing: {}", path.as_ref(), e)
    })?;
    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(has_headers)
        .from_writer(writer))
}

/// An output table that only appears at its path once complete.
///
/// Rows go to a hidden sibling file that `commit()` renames to the final
/// path.  If the output is dropped without commit, e.g. because the run
/// failed, the sibling file is removed.
#[derive(Debug)]
pub struct PendingOutput {
    path: PathBuf,
    path_partial: PathBuf,
    committed: bool,
}

impl PendingOutput {
    pub fn new<P>(path: P) -> Self
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_path_buf();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Keep the file name as suffix so that `.gz` detection still works.
        let path_partial = path.with_file_name(format!(".partial.{}", file_name));
        Self {
            path,
            path_partial,
            committed: false,
        }
    }

    /// Open the tab-separated writer on the partial file.
    pub fn tsv_writer(
        &self,
        has_headers: bool,
    ) -> Result<csv::Writer<Box<dyn Write>>, anyhow::Error> {
        tsv_writer(&self.path_partial, has_headers)
    }

    /// Flush and close `writer`, then move the file to its final path.
    pub fn commit(
        mut self,
        mut writer: csv::Writer<Box<dyn Write>>,
    ) -> Result<(), anyhow::Error> {
        writer.flush()?;
        drop(writer);
        std::fs::rename(&self.path_partial, &self.path).map_err(|e| {
            anyhow::anyhow!(
                "could not move {:?} to {:?}: {}",
                &self.path_partial,
                &self.path,
                e
            )
        })?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PendingOutput {
    fn drop(&mut self) {
        if !self.committed && self.path_partial.exists() {
            if let Err(e) = std::fs::remove_file(&self.path_partial) {
                tracing::warn!("could not remove {:?}: {}", &self.path_partial, e);
            }
        }
    }
}
