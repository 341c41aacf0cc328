//! Reduction of the gene database to exonic gene sets per variant.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    common::schema::Header,
    err::InputError,
    genes::normalize::{is_canonical_token, null_placeholder},
};

/// One retained `(CNV_ID, Gene_ID, Type)` edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GeneEdge {
    pub cnv_id: String,
    pub gene_id: String,
    pub allele: String,
}

/// Resolved gene database columns needed for the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeColumns {
    pub cnv_id: usize,
    pub gene_id: usize,
    pub allele: usize,
    pub exon_overlap: usize,
    pub canonical: usize,
}

impl EdgeColumns {
    pub fn resolve(header: &Header) -> Result<Self, InputError> {
        Ok(Self {
            cnv_id: header.require(&["CNV_ID"])?,
            gene_id: header.require(&["Gene_ID", "Gene"])?,
            allele: header.require(&["Allele"])?,
            exon_overlap: header.require(&["Exon_Overlap"])?,
            canonical: header.require(&["CANONICAL"])?,
        })
    }

    /// The edge of `record` if it overlaps an exon of a canonical transcript.
    pub fn edge(&self, record: &csv::StringRecord) -> Option<GeneEdge> {
        let field = |idx: usize| null_placeholder(record.get(idx).map(str::trim));

        let exon_overlap = field(self.exon_overlap)?.parse::<f32>().ok()?;
        if exon_overlap <= 0.0 || !is_canonical_token(field(self.canonical)?) {
            return None;
        }

        Some(GeneEdge {
            cnv_id: field(self.cnv_id)?.to_string(),
            gene_id: field(self.gene_id)?.to_string(),
            allele: field(self.allele)?.to_string(),
        })
    }
}

/// Exonic genes of one variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantGenes {
    /// Smallest class token over the variant's edges, e.g. `DUP`.
    pub cnv_type: String,
    pub genes: BTreeSet<String>,
}

/// Gene sets keyed by `CNV_ID`.
pub type GeneSets = BTreeMap<String, VariantGenes>;

/// Collapse edges into one gene set per variant.
///
/// Several transcripts of the same gene yield a single gene.
pub fn collapse<I>(edges: I) -> GeneSets
where
    I: IntoIterator<Item = GeneEdge>,
{
    let mut result = GeneSets::new();
    for edge in edges {
        let entry = result.entry(edge.cnv_id).or_default();
        if entry.cnv_type.is_empty() || edge.allele < entry.cnv_type {
            entry.cnv_type = edge.allele;
        }
        entry.genes.insert(edge.gene_id);
    }
    result
}

/// Load the gene sets from a gene database reader past its header.
pub fn load_gene_sets_from<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    columns: &EdgeColumns,
) -> Result<GeneSets, anyhow::Error> {
    let mut rows = 0usize;
    let mut edges = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows += 1;
        if let Some(edge) = columns.edge(&record) {
            edges.push(edge);
        }
    }
    tracing::debug!("retained {} of {} gene database rows", edges.len(), rows);

    Ok(collapse(edges))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{collapse, EdgeColumns, GeneEdge};
    use crate::common::schema::Header;

    fn edge(cnv_id: &str, gene_id: &str, allele: &str) -> GeneEdge {
        GeneEdge {
            cnv_id: cnv_id.to_string(),
            gene_id: gene_id.to_string(),
            allele: allele.to_string(),
        }
    }

    fn columns() -> EdgeColumns {
        let header = Header::new(
            "genes.tsv",
            &csv::StringRecord::from(vec![
                "CNV_ID",
                "Allele",
                "Gene_ID",
                "Exon_Overlap",
                "CANONICAL",
            ]),
        );
        EdgeColumns::resolve(&header).expect("all columns present")
    }

    #[rstest::rstest]
    #[case(&["V1", "DUP", "G1", "0.5", "true"], Some(edge("V1", "G1", "DUP")))]
    #[case(&["V1", "DUP", "G1", "0.5", "YES"], Some(edge("V1", "G1", "DUP")))]
    #[case(&["V1", "DUP", "G1", "0.0", "true"], None)]
    #[case(&["V1", "DUP", "G1", "", "true"], None)]
    #[case(&["V1", "DUP", "G1", "0.5", "false"], None)]
    #[case(&["V1", "DUP", "G1", "0.5", ""], None)]
    #[case(&["V1", "DUP", "", "0.5", "true"], None)]
    fn edge_filter(#[case] fields: &[&str], #[case] expected: Option<GeneEdge>) {
        let record = csv::StringRecord::from(fields.to_vec());

        assert_eq!(columns().edge(&record), expected);
    }

    #[test]
    fn load_gene_sets_fixture() -> Result<(), anyhow::Error> {
        let path = "tests/rcnv/genes.tsv";
        let mut reader = crate::common::io::tsv_reader(path)?;
        let columns = EdgeColumns::resolve(&Header::from_reader(path, &mut reader)?)?;

        let actual = super::load_gene_sets_from(reader, &columns)?;

        assert_eq!(
            actual.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["1_100_500_DUP", "2_100_200_DUP", "3_1000_9000_DEL"]
        );
        assert_eq!(
            actual["1_100_500_DUP"]
                .genes
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>(),
            vec!["G1", "G2", "G3"]
        );
        assert_eq!(actual["2_100_200_DUP"].genes.len(), 1);

        Ok(())
    }

    #[test]
    fn collapse_transcripts_and_type() {
        let actual = collapse(vec![
            edge("V1", "G1", "DUP"),
            edge("V1", "G1", "DUP"),
            edge("V1", "G2", "DUP"),
            edge("V2", "G3", "MIX"),
            edge("V2", "G3", "DEL"),
        ]);

        assert_eq!(actual.len(), 2);
        assert_eq!(actual["V1"].cnv_type, "DUP");
        assert_eq!(
            actual["V1"].genes.iter().cloned().collect::<Vec<_>>(),
            vec![String::from("G1"), String::from("G2")]
        );
        assert_eq!(actual["V2"].cnv_type, "DEL");
        assert_eq!(actual["V2"].genes.len(), 1);
    }
}
