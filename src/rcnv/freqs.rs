//! Distinct sample counts per typed recurrent CNV label.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::cnvs::id::CnvType;

use super::catalog::Catalog;

/// One line of the frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyRow {
    #[serde(rename = "rCNV_ID")]
    pub rcnv_id: String,
    pub num_samples: usize,
}

/// Types that make up the label universe.
const UNIVERSE_TYPES: &[CnvType] = &[CnvType::Dup, CnvType::Del];

/// All `<rCNV_ID>_dup` and `<rCNV_ID>_del` labels of `catalog`.
pub fn universe(catalog: &Catalog) -> Vec<String> {
    catalog
        .entries()
        .iter()
        .flat_map(|entry| {
            UNIVERSE_TYPES
                .iter()
                .map(move |cnv_type| format!("{}_{}", entry.rcnv_id, cnv_type.suffix()))
        })
        .collect()
}

/// Count distinct samples per label over `(SampleID, label)` pairs.
///
/// Every label of the universe is reported, unseen ones with zero.  Labels
/// outside the universe are ignored.  Rows are sorted by label.
pub fn count_samples<'a, I>(catalog: &Catalog, labelled: I) -> Vec<FrequencyRow>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut samples: BTreeMap<String, BTreeSet<&'a str>> = universe(catalog)
        .into_iter()
        .map(|label| (label, BTreeSet::new()))
        .collect();

    for (sample_id, label) in labelled {
        match samples.get_mut(label) {
            Some(seen) => {
                seen.insert(sample_id);
            }
            None => tracing::trace!("label {} not in frequency universe", label),
        }
    }

    samples
        .into_iter()
        .map(|(rcnv_id, seen)| FrequencyRow {
            rcnv_id,
            num_samples: seen.len(),
        })
        .collect()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{count_samples, universe, FrequencyRow};
    use crate::rcnv::catalog::{parse_gene_set, Catalog, CatalogBuilder};

    fn catalog() -> Catalog {
        let mut builder = CatalogBuilder::default();
        builder.add("R2", parse_gene_set("G3"));
        builder.add("R1", parse_gene_set("G1,G2"));
        builder.add("R3", parse_gene_set(""));
        builder.build()
    }

    fn row(rcnv_id: &str, num_samples: usize) -> FrequencyRow {
        FrequencyRow {
            rcnv_id: rcnv_id.to_string(),
            num_samples,
        }
    }

    #[test]
    fn universe_is_complete() {
        let catalog = catalog();

        let actual = universe(&catalog);

        assert_eq!(actual.len(), 2 * catalog.len());
        assert_eq!(actual[0], "R1_dup");
        assert_eq!(actual[1], "R1_del");
    }

    #[test]
    fn count_distinct_samples() {
        let actual = count_samples(
            &catalog(),
            vec![
                ("S1", "R1_dup"),
                ("S1", "R1_dup"),
                ("S2", "R1_dup"),
                ("S3", "R2_del"),
                ("S4", "R2_mix"),
            ],
        );

        assert_eq!(
            actual,
            vec![
                row("R1_del", 0),
                row("R1_dup", 2),
                row("R2_del", 1),
                row("R2_dup", 0),
                row("R3_del", 0),
                row("R3_dup", 0),
            ]
        );
    }

    #[test]
    fn count_without_matches() {
        let actual = count_samples(&catalog(), Vec::<(&str, &str)>::new());

        assert_eq!(actual.len(), 6);
        assert!(actual.iter().all(|row| row.num_samples == 0));
    }
}
