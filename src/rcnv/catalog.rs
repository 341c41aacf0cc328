//! The recurrent CNV catalog and its gene index.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use crate::common::{schema::Header, GenomeRelease};

/// Split a comma-separated gene list, trimming tokens and dropping empty ones.
pub fn parse_gene_set(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|gene| !gene.is_empty())
        .map(String::from)
        .collect()
}

/// One recurrent CNV with its gene set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub rcnv_id: String,
    pub genes: BTreeSet<String>,
}

/// Collects catalog entries before freezing them into a `Catalog`.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl CatalogBuilder {
    /// Add an entry, merging gene sets of repeated identifiers.
    pub fn add(&mut self, rcnv_id: &str, genes: BTreeSet<String>) {
        if let Some(existing) = self.entries.get_mut(rcnv_id) {
            tracing::warn!("rCNV_ID {} given more than once, merging gene sets", rcnv_id);
            existing.extend(genes);
        } else {
            self.entries.insert(rcnv_id.to_string(), genes);
        }
    }

    pub fn build(self) -> Catalog {
        let entries = self
            .entries
            .into_iter()
            .map(|(rcnv_id, genes)| CatalogEntry { rcnv_id, genes })
            .collect::<Vec<_>>();

        let mut by_gene: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            if entry.genes.is_empty() {
                tracing::warn!("rCNV_ID {} has no genes and never matches", entry.rcnv_id);
            }
            for gene in &entry.genes {
                by_gene.entry(gene.clone()).or_default().push(idx);
            }
        }

        Catalog { entries, by_gene }
    }
}

/// Read-only catalog, entries sorted by `rCNV_ID`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    /// Gene to indices of the entries containing it.
    by_gene: IndexMap<String, Vec<usize>>,
}

impl Catalog {
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `gene` is in the union of all gene sets.
    pub fn contains_gene(&self, gene: &str) -> bool {
        self.by_gene.contains_key(gene)
    }

    /// Indices of the entries whose gene set contains `gene`.
    pub fn entries_with_gene(&self, gene: &str) -> &[usize] {
        self.by_gene.get(gene).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of distinct genes over all entries.
    pub fn num_genes(&self) -> usize {
        self.by_gene.len()
    }
}

/// Resolved catalog columns for one genome release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogColumns {
    pub rcnv_id: usize,
    pub gene_set: usize,
}

impl CatalogColumns {
    pub fn resolve(
        header: &Header,
        genome_release: GenomeRelease,
    ) -> Result<Self, crate::err::InputError> {
        Ok(Self {
            rcnv_id: header.require(&["rCNV_ID"])?,
            gene_set: header.require(&[genome_release.geneset_column().as_str()])?,
        })
    }
}

/// Load the catalog from a reader past its header.
pub fn load_catalog_from<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    columns: &CatalogColumns,
) -> Result<Catalog, anyhow::Error> {
    let mut builder = CatalogBuilder::default();
    for record in reader.records() {
        let record = record?;
        let rcnv_id = record.get(columns.rcnv_id).unwrap_or_default().trim();
        if rcnv_id.is_empty() {
            tracing::warn!("skipping catalog line without rCNV_ID: {:?}", &record);
            continue;
        }
        builder.add(
            rcnv_id,
            parse_gene_set(record.get(columns.gene_set).unwrap_or_default()),
        );
    }

    let catalog = builder.build();
    tracing::debug!(
        "catalog has {} entries over {} genes",
        catalog.len(),
        catalog.num_genes()
    );
    Ok(catalog)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{load_catalog_from, parse_gene_set, Catalog, CatalogBuilder, CatalogColumns};
    use crate::common::{io::tsv_reader, schema::Header, GenomeRelease};

    fn load_catalog(path: &str, genome_release: GenomeRelease) -> Result<Catalog, anyhow::Error> {
        let mut reader = tsv_reader(path)?;
        let header = Header::from_reader(path, &mut reader)?;
        let columns = CatalogColumns::resolve(&header, genome_release)?;
        load_catalog_from(reader, &columns)
    }

    #[rstest::rstest]
    #[case("G1,G2", &["G1", "G2"])]
    #[case(" G2 , G1 ,G2", &["G1", "G2"])]
    #[case("G1,,G2,", &["G1", "G2"])]
    #[case("", &[])]
    fn parse_gene_set_cases(#[case] value: &str, #[case] expected: &[&str]) {
        assert_eq!(
            parse_gene_set(value).into_iter().collect::<Vec<_>>(),
            expected.iter().map(|s| s.to_string()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn builder_merges_and_indexes() {
        let mut builder = CatalogBuilder::default();
        builder.add("R2", parse_gene_set("G2,G3"));
        builder.add("R1", parse_gene_set("G1,G2"));
        builder.add("R2", parse_gene_set("G4"));
        builder.add("R3", parse_gene_set(""));
        let catalog = builder.build();

        assert_eq!(
            catalog
                .entries()
                .iter()
                .map(|entry| entry.rcnv_id.as_str())
                .collect::<Vec<_>>(),
            vec!["R1", "R2", "R3"]
        );
        assert_eq!(catalog.entries()[1].genes.len(), 3);
        assert_eq!(catalog.entries_with_gene("G2"), &[0, 1]);
        assert_eq!(catalog.entries_with_gene("G5"), &[] as &[usize]);
        assert!(catalog.contains_gene("G4"));
        assert_eq!(catalog.num_genes(), 4);
    }

    #[rstest::rstest]
    #[case(GenomeRelease::Grch37, &["G1"])]
    #[case(GenomeRelease::Grch38, &["G1", "G2"])]
    fn load_catalog_release(
        #[case] genome_release: GenomeRelease,
        #[case] r1_genes: &[&str],
    ) -> Result<(), anyhow::Error> {
        let catalog = load_catalog("tests/rcnv/catalog.tsv", genome_release)?;

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.entries()[0].rcnv_id, "R1");
        assert_eq!(
            catalog.entries()[0]
                .genes
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>(),
            r1_genes.to_vec()
        );

        Ok(())
    }

    #[test]
    fn load_catalog_missing_release_column() {
        let result = load_catalog("tests/rcnv/catalog_grch37_only.tsv", GenomeRelease::Grch38);

        assert!(result.is_err());
    }
}
