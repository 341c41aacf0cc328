//! Canonical CNV identifiers and copy-number classes.

use crate::err::FieldError;

/// Separator between the tokens of a `CNV_ID`.
pub const DELIMITER: char = '_';

/// Characters that separate coordinates in location strings such as
/// `1:1000-2000` and are replaced by `DELIMITER`.
const COORD_SEPARATORS: &[char] = &[':', '-', '|'];

/// Copy-number class of a CNV.
#[derive(
    strum::Display,
    strum::EnumString,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Clone,
    Copy,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum CnvType {
    /// Deletion, all copy numbers below two.
    Del,
    /// Duplication, all copy numbers two or above.
    Dup,
    /// Mixture of losses and gains.
    Mix,
}

impl CnvType {
    /// Lower-case suffix used for typed recurrent CNV labels, e.g. `dup`.
    pub fn suffix(&self) -> String {
        self.to_string().to_lowercase()
    }

    /// Derive the class from the copy numbers of the merged calls.
    ///
    /// Returns `None` for an empty list.
    pub fn from_copy_numbers(copy_numbers: &[i32]) -> Option<Self> {
        let min = copy_numbers.iter().min()?;
        let max = copy_numbers.iter().max()?;
        Some(if *min >= 2 && *max >= 2 {
            CnvType::Dup
        } else if *min < 2 && *max < 2 {
            CnvType::Del
        } else {
            CnvType::Mix
        })
    }
}

/// Parse a comma-separated copy-number list such as `"1,0"`.
pub fn parse_copy_numbers(value: &str) -> Result<Vec<i32>, FieldError> {
    let result = value
        .split(',')
        .map(|token| token.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| FieldError::InvalidCopyNumbers(value.to_string()))?;
    if result.is_empty() {
        Err(FieldError::InvalidCopyNumbers(value.to_string()))
    } else {
        Ok(result)
    }
}

/// Normalize a raw class or allele token to its three-letter upper-case form.
///
/// This maps `"duplication"` to `"DUP"` and `"deletion"` to `"DEL"`.
pub fn normalize_class(token: &str) -> String {
    token.trim().chars().take(3).collect::<String>().to_uppercase()
}

/// Build the `CNV_ID` from a location string and a raw class token.
///
/// `cnv_id_from_location("1:1000-2000", "duplication")` gives
/// `"1_1000_2000_DUP"`.
pub fn cnv_id_from_location(location: &str, class: &str) -> String {
    let combined = format!("{}{}{}", location.trim(), DELIMITER, normalize_class(class));
    combined.replace(COORD_SEPARATORS, &DELIMITER.to_string())
}

/// Build the `CNV_ID` from separate coordinates and a raw class token.
///
/// Gives the same identifier as `cnv_id_from_location()` for the matching
/// `chrom:start-end` location.
pub fn cnv_id_from_coords(chrom: &str, start: i64, end: i64, class: &str) -> String {
    cnv_id_from_location(&format!("{}:{}-{}", chrom.trim(), start, end), class)
}
