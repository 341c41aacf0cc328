//! Normalization of raw per-transcript annotation fields.
//!
//! All functions here are pure.  Unparseable values never abort a run, they
//! are logged at `trace` level and turned into `None`.

use std::str::FromStr;

use crate::err::FieldError;

/// Token used by VEP for "no value".
pub const PLACEHOLDER: &str = "-";

/// Marker of canonical transcripts in the `CANONICAL` field.
pub const CANONICAL_MARKER: &str = "YES";

/// Treat empty fields and the placeholder as missing.
pub fn null_placeholder(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty() && *value != PLACEHOLDER)
}

/// Parsed `EXON` field, e.g. `3/10` or `2-5/10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExonPosition {
    /// Lower exon number of the overlapped range.
    pub first: u32,
    /// Upper exon number, equal to `first` for a single exon.
    pub last: u32,
    /// Number of exons of the transcript.
    pub total: u32,
}

impl ExonPosition {
    /// Fraction of the transcript's exons that are overlapped.
    pub fn fraction(&self) -> f32 {
        (self.last - self.first + 1) as f32 / self.total as f32
    }
}

impl FromStr for ExonPosition {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || FieldError::InvalidExon(s.to_string());
        let parse = |token: &str| token.trim().parse::<u32>().map_err(|_| err());

        let (range, total) = s.split_once('/').ok_or_else(err)?;
        let total = parse(total)?;
        if total == 0 {
            return Err(err());
        }
        let (first, last) = match range.split_once('-') {
            Some((a, b)) => {
                let (a, b) = (parse(a)?, parse(b)?);
                (a.min(b), a.max(b))
            }
            None => match parse(range)? {
                0 => return Err(err()),
                a => (a, a),
            },
        };

        // A single exon always counts as one exon of `total`.
        if first != last && last > total {
            Err(err())
        } else {
            Ok(Self { first, last, total })
        }
    }
}

/// Compute the fraction of exons overlapped.
///
/// A missing `EXON` field gives `None`.  When the field is present but cannot
/// be parsed, a transcript that is fully overlapped according to `OverlapPC`
/// counts as fully overlapped; anything else gives `None`.
pub fn exon_overlap(exon: Option<&str>, overlap_pc: Option<&str>) -> Option<f32> {
    let exon = exon?;
    match exon.parse::<ExonPosition>() {
        Ok(position) => Some(position.fraction()),
        Err(e) => {
            tracing::trace!("{}", e);
            if overlap_pc.map_or(false, |pc| pc.contains("100")) {
                Some(1.0)
            } else {
                None
            }
        }
    }
}

/// Parse a percentage such as `"42.5"` or `"100%"` into a fraction.
pub fn parse_percentage(value: &str) -> Result<f32, FieldError> {
    let err = || FieldError::InvalidPercentage(value.to_string());
    let pc = value
        .trim()
        .trim_end_matches('%')
        .parse::<f32>()
        .map_err(|_| err())?;
    if (0.0..=100.0).contains(&pc) {
        Ok(pc / 100.0)
    } else {
        Err(err())
    }
}

/// Fraction of the transcript's base pairs overlapped, from `OverlapPC`.
pub fn transcript_overlap(overlap_pc: Option<&str>) -> Option<f32> {
    parse_percentage(overlap_pc?)
        .map_err(|e| tracing::trace!("{}", e))
        .ok()
}

/// Maximum of a comma-separated list of allele frequencies.
///
/// Tokens that are not numbers are skipped; a list without any number is an
/// error.
pub fn max_frequency(value: &str) -> Result<f32, FieldError> {
    value
        .split(',')
        .filter_map(|token| token.trim().parse::<f32>().ok())
        .filter(|af| !af.is_nan())
        .reduce(f32::max)
        .ok_or_else(|| FieldError::InvalidFrequencies(value.to_string()))
}

/// Maximum allele frequency across all populations.
///
/// Returns `None` if no population has a value.  The gene database writes
/// this as `0.0` together with an "observed" flag, so "no data" and "not
/// seen" stay distinguishable.
pub fn max_population_af<'a, I>(values: I) -> Option<f32>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    values
        .into_iter()
        .flatten()
        .filter_map(|value| {
            max_frequency(value)
                .map_err(|e| tracing::trace!("{}", e))
                .ok()
        })
        .reduce(f32::max)
}

/// Canonical transcript flag.
///
/// Rows without transcript give `None`; otherwise the raw `CANONICAL` token is
/// checked for the marker.  A `true` token is accepted as well so that
/// already normalized tables keep their flag.
pub fn canonical_flag(transcript: Option<&str>, canonical: Option<&str>) -> Option<bool> {
    transcript?;
    Some(canonical.map_or(false, is_canonical_token))
}

/// Whether a raw or normalized `CANONICAL` token marks a canonical transcript.
pub fn is_canonical_token(token: &str) -> bool {
    token.contains(CANONICAL_MARKER) || token.trim().eq_ignore_ascii_case("true")
}

/// Split the comma-separated `Consequence` field.
pub fn consequences(value: Option<&str>) -> Vec<String> {
    value
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
