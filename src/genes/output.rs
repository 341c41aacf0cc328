//! Records of the gene database written by `genes build`.

use serde::{Deserialize, Serialize};
use serde_with::{formats::CommaSeparator, serde_as, StringWithSeparator};

/// Normalized overlap of one CNV with one transcript.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptOverlap {
    /// Canonical CNV identifier, e.g. `1_1000_2000_DUP`.
    #[serde(rename = "CNV_ID")]
    pub cnv_id: String,
    /// Location as reported by the annotator, e.g. `1:1000-2000`.
    #[serde(rename = "Location")]
    pub location: String,
    /// Normalized three-letter class token.
    #[serde(rename = "Allele")]
    pub allele: String,
    #[serde(rename = "Gene_ID")]
    pub gene_id: Option<String>,
    #[serde(rename = "Transcript_ID")]
    pub transcript_id: Option<String>,
    /// Sequence ontology consequence terms.
    #[serde(rename = "Consequence")]
    #[serde_as(as = "StringWithSeparator::<CommaSeparator, String>")]
    pub consequences: Vec<String>,
    /// Raw exon position, e.g. `2-5/10`.
    #[serde(rename = "EXON")]
    pub exon: Option<String>,
    /// Fraction of the transcript's exons overlapped.
    #[serde(rename = "Exon_Overlap")]
    pub exon_overlap: Option<f32>,
    /// Fraction of the transcript's base pairs overlapped.
    #[serde(rename = "Transcript_BP_Overlap")]
    pub transcript_overlap: Option<f32>,
    /// Maximal population allele frequency, `0.0` if not observed.
    #[serde(rename = "Gnomad_Max_AF")]
    pub gnomad_max_af: f32,
    /// Whether any population had a frequency value.
    #[serde(rename = "Gnomad_AF_Observed")]
    pub gnomad_af_observed: bool,
    /// Whether the transcript is the canonical one, `None` without transcript.
    #[serde(rename = "CANONICAL")]
    pub canonical: Option<bool>,
}

impl TranscriptOverlap {
    /// Maximal population allele frequency, `None` if no population had data.
    pub fn max_population_af(&self) -> Option<f32> {
        self.gnomad_af_observed.then_some(self.gnomad_max_af)
    }

    /// Set both frequency columns from the optional maximum.
    pub fn set_max_population_af(&mut self, af: Option<f32>) {
        self.gnomad_max_af = af.unwrap_or_default();
        self.gnomad_af_observed = af.is_some();
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::TranscriptOverlap;

    fn example() -> TranscriptOverlap {
        TranscriptOverlap {
            cnv_id: String::from("1_1000_2000_DUP"),
            location: String::from("1:1000-2000"),
            allele: String::from("DUP"),
            gene_id: Some(String::from("ENSG1")),
            transcript_id: Some(String::from("ENST1")),
            consequences: vec![
                String::from("transcript_amplification"),
                String::from("coding_sequence_variant"),
            ],
            exon: Some(String::from("1-2/4")),
            exon_overlap: Some(0.5),
            transcript_overlap: Some(0.25),
            gnomad_max_af: 0.0,
            gnomad_af_observed: false,
            canonical: Some(true),
        }
    }

    #[test]
    fn max_population_af() {
        let mut record = example();
        assert_eq!(record.max_population_af(), None);

        record.set_max_population_af(Some(0.0));
        assert_eq!(record.max_population_af(), Some(0.0));
        assert!(record.gnomad_af_observed);

        record.set_max_population_af(None);
        assert_eq!((record.gnomad_max_af, record.gnomad_af_observed), (0.0, false));
    }

    #[test]
    fn serialize_tsv() -> Result<(), anyhow::Error> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(vec![]);
        let mut record = example();
        writer.serialize(&record)?;
        record.gene_id = None;
        record.transcript_id = None;
        record.consequences = vec![];
        record.exon = None;
        record.exon_overlap = None;
        record.canonical = Some(false);
        writer.serialize(&record)?;

        let output = String::from_utf8(writer.into_inner()?)?;
        insta::assert_snapshot!(output);

        Ok(())
    }
}
