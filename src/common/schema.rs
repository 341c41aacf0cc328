//! Named column resolution for input tables.
//!
//! Every table is resolved once, right after its header line is read.  Lookups
//! are case-insensitive and may try several aliases for the same column so
//! that the rest of the code never depends on column positions.

use indexmap::IndexMap;

use crate::err::InputError;

/// The header line of an input table.
#[derive(Debug, Clone)]
pub struct Header {
    /// Path of the table, for error messages.
    path: String,
    /// Column names as given in the file.
    names: Vec<String>,
    /// Lower-cased column name to index, first occurrence wins.
    by_lower: IndexMap<String, usize>,
}

impl Header {
    /// Construct from the header record of `path`.
    pub fn new(path: &str, record: &csv::StringRecord) -> Self {
        let names: Vec<String> = record.iter().map(|name| name.to_string()).collect();
        let mut by_lower = IndexMap::new();
        for (idx, name) in names.iter().enumerate() {
            by_lower.entry(name.to_lowercase()).or_insert(idx);
        }
        Self {
            path: path.to_string(),
            names,
            by_lower,
        }
    }

    /// Read the header of `reader` which reads from `path`.
    pub fn from_reader<R: std::io::Read>(
        path: &str,
        reader: &mut csv::Reader<R>,
    ) -> Result<Self, anyhow::Error> {
        let record = reader
            .headers()
            .map_err(|e| anyhow::anyhow!("could not read header of {}: {}", path, e))?;
        let header = Self::new(path, record);
        if header.is_empty() {
            anyhow::bail!("{} has no header line", path);
        }
        Ok(header)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index of the first of `aliases` that is present.
    pub fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| self.by_lower.get(&alias.to_lowercase()).copied())
    }

    /// Like `find()` but a missing column is a schema error named after the
    /// first alias.
    pub fn require(&self, aliases: &[&str]) -> Result<usize, InputError> {
        self.find(aliases)
            .ok_or_else(|| self.missing(aliases.first().copied().unwrap_or_default()))
    }

    /// Construct an `InputError::MissingColumn` for `column`.
    pub fn missing(&self, column: &str) -> InputError {
        InputError::MissingColumn {
            path: self.path.clone(),
            column: column.to_string(),
            header: self.names.join(", "),
        }
    }

    /// Indices of all columns whose lower-cased name starts with `prefix`.
    pub fn with_prefix(&self, prefix: &str) -> Vec<usize> {
        let prefix = prefix.to_lowercase();
        self.names
            .iter()
            .enumerate()
            .filter(|(_, name)| name.to_lowercase().starts_with(&prefix))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Construct an `InputError::InvalidValue` for the given position.
    pub fn invalid_value(&self, line: u64, column: usize, value: &str) -> InputError {
        InputError::InvalidValue {
            path: self.path.clone(),
            line,
            column: self.names.get(column).cloned().unwrap_or_default(),
            value: value.to_string(),
        }
    }
}

/// Line number of `record` for error messages, 0 when unknown.
pub fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|pos| pos.line()).unwrap_or_default()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::err::InputError;

    fn header(names: &[&str]) -> super::Header {
        super::Header::new("test.tsv", &csv::StringRecord::from(names.to_vec()))
    }

    #[rstest::rstest]
    #[case(&["chr"], Some(1))]
    #[case(&["CHR"], Some(1))]
    #[case(&["chromosome", "chr"], Some(1))]
    #[case(&["start"], Some(2))]
    #[case(&["copy_number"], None)]
    fn find(#[case] aliases: &[&str], #[case] expected: Option<usize>) {
        let header = header(&["SampleID", "Chr", "Start", "End", "Type"]);

        assert_eq!(header.find(aliases), expected);
    }

    #[test]
    fn find_first_occurrence_wins() {
        let header = header(&["Gene", "gene"]);

        assert_eq!(header.find(&["GENE"]), Some(0));
    }

    #[test]
    fn require_missing() {
        let header = header(&["SampleID", "Chr"]);

        assert_eq!(
            header.require(&["Start", "begin"]),
            Err(InputError::MissingColumn {
                path: String::from("test.tsv"),
                column: String::from("Start"),
                header: String::from("SampleID, Chr"),
            })
        );
    }

    #[test]
    fn with_prefix() {
        let header = header(&["Gene", "gnomad_AF_afr", "GNOMAD_AF_nfe", "Feature"]);

        assert_eq!(header.with_prefix("gnomad"), vec![1, 2]);
    }
}
