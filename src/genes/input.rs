//! Column resolution for annotation tables and per-row normalization.
//!
//! Tables may come straight from VEP (`Feature`, `Gene`, `OverlapPC`,
//! `gnomad_*`) or be a gene database written earlier.  Columns that are
//! already normalized are taken as they are.

use crate::{
    cnvs::id::{cnv_id_from_location, normalize_class},
    common::schema::{line_of, Header},
    err::InputError,
};

use super::{normalize, output::TranscriptOverlap};

/// Source of the transcript base pair overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapSource {
    /// Raw percentage as in VEP's `OverlapPC`.
    Percentage(usize),
    /// Already normalized `Transcript_BP_Overlap` fraction.
    Fraction(usize),
}

/// Source of the maximal population allele frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrequencySource {
    /// One comma-separated frequency list per population.
    Populations(Vec<usize>),
    /// Already normalized `Gnomad_Max_AF` with optional observed flag.
    Normalized {
        max_af: usize,
        observed: Option<usize>,
    },
}

/// Resolved columns of an annotation table.
#[derive(Debug, Clone)]
pub struct AnnotationColumns {
    pub location: usize,
    pub allele: usize,
    pub transcript: usize,
    pub gene: usize,
    pub consequence: usize,
    pub canonical: usize,
    pub exon: Option<usize>,
    pub exon_overlap: Option<usize>,
    pub overlap: OverlapSource,
    pub frequencies: FrequencySource,
}

/// Prefix of per-population frequency columns.
const GNOMAD_PREFIX: &str = "gnomad";
const GNOMAD_MAX_AF: &str = "Gnomad_Max_AF";
const GNOMAD_AF_OBSERVED: &str = "Gnomad_AF_Observed";

impl AnnotationColumns {
    pub fn resolve(header: &Header) -> Result<Self, InputError> {
        let exon = header.find(&["EXON"]);
        let exon_overlap = header.find(&["Exon_Overlap"]);
        if exon.is_none() && exon_overlap.is_none() {
            return Err(header.missing("EXON"));
        }

        let overlap = match (header.find(&["OverlapPC"]), header.find(&["Transcript_BP_Overlap"])) {
            (Some(idx), _) => OverlapSource::Percentage(idx),
            (None, Some(idx)) => OverlapSource::Fraction(idx),
            (None, None) => return Err(header.missing("OverlapPC")),
        };

        let frequencies = match header.find(&[GNOMAD_MAX_AF]) {
            Some(max_af) => FrequencySource::Normalized {
                max_af,
                observed: header.find(&[GNOMAD_AF_OBSERVED]),
            },
            None => {
                let populations = header.with_prefix(GNOMAD_PREFIX);
                if populations.is_empty() {
                    tracing::warn!(
                        "{}: no {}_* columns, all population frequencies are missing",
                        header.path(),
                        GNOMAD_PREFIX
                    );
                }
                FrequencySource::Populations(populations)
            }
        };

        Ok(Self {
            location: header.require(&["Location"])?,
            allele: header.require(&["Allele"])?,
            transcript: header.require(&["Feature", "Transcript_ID"])?,
            gene: header.require(&["Gene", "Gene_ID"])?,
            consequence: header.require(&["Consequence"])?,
            canonical: header.require(&["CANONICAL"])?,
            exon,
            exon_overlap,
            overlap,
            frequencies,
        })
    }

    /// Normalize one annotation row.
    ///
    /// Only a missing `Location` or `Allele` is an error, field values that
    /// cannot be parsed become `None`.
    pub fn normalize(
        &self,
        header: &Header,
        record: &csv::StringRecord,
    ) -> Result<TranscriptOverlap, InputError> {
        let field = |idx: usize| normalize::null_placeholder(record.get(idx));
        let required = |idx: usize| {
            field(idx).ok_or_else(|| {
                header.invalid_value(line_of(record), idx, record.get(idx).unwrap_or_default())
            })
        };
        let fraction = |idx: usize| {
            field(idx).and_then(|value| {
                value
                    .trim()
                    .parse::<f32>()
                    .map_err(|e| tracing::trace!("invalid fraction {:?}: {}", value, e))
                    .ok()
            })
        };

        let location = required(self.location)?;
        let allele = normalize_class(required(self.allele)?);
        let transcript_id = field(self.transcript);
        let exon = self.exon.and_then(field);

        let overlap_pc = match self.overlap {
            OverlapSource::Percentage(idx) => field(idx),
            OverlapSource::Fraction(_) => None,
        };
        let exon_overlap = match self.exon_overlap {
            Some(idx) => fraction(idx),
            None => normalize::exon_overlap(exon, overlap_pc),
        };
        let transcript_overlap = match self.overlap {
            OverlapSource::Percentage(idx) => normalize::transcript_overlap(field(idx)),
            OverlapSource::Fraction(idx) => fraction(idx),
        };
        let max_population_af = match &self.frequencies {
            FrequencySource::Populations(idxs) => {
                normalize::max_population_af(idxs.iter().map(|idx| field(*idx)))
            }
            FrequencySource::Normalized { max_af, observed } => {
                let observed = observed
                    .and_then(field)
                    .map_or(true, |value| value.trim().eq_ignore_ascii_case("true"));
                fraction(*max_af).filter(|_| observed)
            }
        };

        let mut result = TranscriptOverlap {
            cnv_id: cnv_id_from_location(location, &allele),
            location: location.to_string(),
            allele,
            gene_id: field(self.gene).map(String::from),
            transcript_id: transcript_id.map(String::from),
            consequences: normalize::consequences(field(self.consequence)),
            exon: exon.map(String::from),
            exon_overlap,
            transcript_overlap,
            gnomad_max_af: 0.0,
            gnomad_af_observed: false,
            canonical: normalize::canonical_flag(transcript_id, record.get(self.canonical)),
        };
        result.set_max_population_af(max_population_af);

        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::{common::schema::Header, err::InputError};

    use super::{AnnotationColumns, FrequencySource, OverlapSource};

    const VEP_HEADER: &[&str] = &[
        "#Uploaded_variation",
        "Location",
        "Allele",
        "Gene",
        "Feature",
        "Consequence",
        "EXON",
        "OverlapPC",
        "CANONICAL",
        "gnomad_AF_afr",
        "gnomad_AF_nfe",
    ];

    fn header(names: &[&str]) -> Header {
        Header::new("vep.tsv", &csv::StringRecord::from(names.to_vec()))
    }

    #[test]
    fn resolve_raw() -> Result<(), anyhow::Error> {
        let columns = AnnotationColumns::resolve(&header(VEP_HEADER))?;

        assert_eq!(columns.transcript, 4);
        assert_eq!(columns.exon, Some(6));
        assert_eq!(columns.exon_overlap, None);
        assert_eq!(columns.overlap, OverlapSource::Percentage(7));
        assert_eq!(columns.frequencies, FrequencySource::Populations(vec![9, 10]));

        Ok(())
    }

    #[test]
    fn resolve_missing_exon() {
        let names = VEP_HEADER
            .iter()
            .copied()
            .filter(|name| *name != "EXON")
            .collect::<Vec<_>>();

        assert!(matches!(
            AnnotationColumns::resolve(&header(&names)),
            Err(InputError::MissingColumn { column, .. }) if column == "EXON"
        ));
    }

    #[test]
    fn normalize_raw_row() -> Result<(), anyhow::Error> {
        let header = header(VEP_HEADER);
        let columns = AnnotationColumns::resolve(&header)?;
        let record = csv::StringRecord::from(vec![
            "1_1000_2000_DUP",
            "1:1000-2000",
            "duplication",
            "ENSG1",
            "ENST1",
            "transcript_amplification,coding_sequence_variant",
            "2-3/4",
            "50",
            "YES",
            "-",
            "0.25,0.5",
        ]);

        let actual = columns.normalize(&header, &record)?;

        assert_eq!(actual.cnv_id, "1_1000_2000_DUP");
        assert_eq!(actual.allele, "DUP");
        assert_eq!(actual.gene_id.as_deref(), Some("ENSG1"));
        assert_eq!(actual.consequences.len(), 2);
        assert_eq!(actual.exon_overlap, Some(0.5));
        assert_eq!(actual.transcript_overlap, Some(0.5));
        assert_eq!(actual.max_population_af(), Some(0.5));
        assert_eq!(actual.canonical, Some(true));

        Ok(())
    }

    #[test]
    fn normalize_intergenic_row() -> Result<(), anyhow::Error> {
        let header = header(VEP_HEADER);
        let columns = AnnotationColumns::resolve(&header)?;
        let record = csv::StringRecord::from(vec![
            "1_1000_2000_DEL",
            "1:1000-2000",
            "deletion",
            "-",
            "-",
            "intergenic_variant",
            "-",
            "-",
            "-",
            "-",
            "-",
        ]);

        let actual = columns.normalize(&header, &record)?;

        assert_eq!(actual.cnv_id, "1_1000_2000_DEL");
        assert_eq!(actual.gene_id, None);
        assert_eq!(actual.transcript_id, None);
        assert_eq!(actual.exon_overlap, None);
        assert_eq!(actual.transcript_overlap, None);
        assert_eq!(actual.max_population_af(), None);
        assert_eq!(actual.canonical, None);

        Ok(())
    }

    #[test]
    fn normalize_missing_location() -> Result<(), anyhow::Error> {
        let header = header(VEP_HEADER);
        let columns = AnnotationColumns::resolve(&header)?;
        let mut fields = vec!["-"; VEP_HEADER.len()];
        fields[2] = "deletion";

        assert!(matches!(
            columns.normalize(&header, &csv::StringRecord::from(fields)),
            Err(InputError::InvalidValue { column, .. }) if column == "Location"
        ));

        Ok(())
    }

    #[test]
    fn normalize_normalized_row() -> Result<(), anyhow::Error> {
        let header = header(&[
            "CNV_ID",
            "Location",
            "Allele",
            "Gene_ID",
            "Transcript_ID",
            "Consequence",
            "EXON",
            "Exon_Overlap",
            "Transcript_BP_Overlap",
            "Gnomad_Max_AF",
            "Gnomad_AF_Observed",
            "CANONICAL",
        ]);
        let columns = AnnotationColumns::resolve(&header)?;
        let record = csv::StringRecord::from(vec![
            "1_1000_2000_DUP",
            "1:1000-2000",
            "DUP",
            "ENSG1",
            "ENST1",
            "feature_amplification",
            "x/4",
            "1.0",
            "1.0",
            "0.0",
            "false",
            "true",
        ]);

        let actual = columns.normalize(&header, &record)?;

        assert_eq!(actual.exon_overlap, Some(1.0));
        assert_eq!(actual.transcript_overlap, Some(1.0));
        assert_eq!(actual.max_population_af(), None);
        assert_eq!(actual.canonical, Some(true));

        Ok(())
    }
}
