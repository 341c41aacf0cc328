//! Column resolution and row access for sample-level variant tables.

use crate::{
    common::schema::{line_of, Header},
    err::InputError,
};

use super::id::{cnv_id_from_coords, normalize_class, parse_copy_numbers, CnvType};

pub const SAMPLE_ID: &[&str] = &["SampleID", "sample_id", "sample"];
pub const CNV_ID: &[&str] = &["CNV_ID"];
pub const CHROM: &[&str] = &["Chr", "Chromosome", "chrom"];
pub const START: &[&str] = &["Start", "begin"];
pub const END: &[&str] = &["End", "stop"];
pub const TYPE: &[&str] = &["Type", "CN_Type", "sv_type"];
pub const COPY_NUMBER: &[&str] = &["Copy_Number", "CN"];

/// Where the copy-number class of a row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassSource {
    /// Raw class token such as `DUP` or `deletion`.
    Type(usize),
    /// Comma-separated copy numbers, classified with `CnvType::from_copy_numbers`.
    CopyNumber(usize),
}

/// Resolved coordinate columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordColumns {
    pub chrom: usize,
    pub start: usize,
    pub end: usize,
    pub class: ClassSource,
}

impl CoordColumns {
    pub fn resolve(header: &Header) -> Result<Self, InputError> {
        let class = match (header.find(TYPE), header.find(COPY_NUMBER)) {
            (Some(idx), _) => ClassSource::Type(idx),
            (None, Some(idx)) => ClassSource::CopyNumber(idx),
            (None, None) => return Err(header.missing(TYPE[0])),
        };
        Ok(Self {
            chrom: header.require(CHROM)?,
            start: header.require(START)?,
            end: header.require(END)?,
            class,
        })
    }

    /// Extract the variant key from `record`.
    pub fn key(&self, header: &Header, record: &csv::StringRecord) -> Result<VariantKey, InputError> {
        let field = |idx: usize| record.get(idx).unwrap_or_default().trim();
        let int = |idx: usize| {
            field(idx)
                .parse::<i64>()
                .map_err(|_| header.invalid_value(line_of(record), idx, field(idx)))
        };

        let class = match self.class {
            ClassSource::Type(idx) => normalize_class(field(idx)),
            ClassSource::CopyNumber(idx) => parse_copy_numbers(field(idx))
                .ok()
                .and_then(|copy_numbers| CnvType::from_copy_numbers(&copy_numbers))
                .ok_or_else(|| header.invalid_value(line_of(record), idx, field(idx)))?
                .to_string(),
        };

        Ok(VariantKey {
            chrom: field(self.chrom).to_string(),
            start: int(self.start)?,
            end: int(self.end)?,
            class,
        })
    }
}

/// Identity of a variant: location and normalized class token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariantKey {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub class: String,
}

impl VariantKey {
    pub fn cnv_id(&self) -> String {
        cnv_id_from_coords(&self.chrom, self.start, self.end, &self.class)
    }
}

/// Resolved columns of a variant table used for annotation.
///
/// Either an existing `CNV_ID` column or the coordinate columns must be
/// present; an existing `CNV_ID` takes precedence.
#[derive(Debug, Clone)]
pub struct VariantColumns {
    pub header: Header,
    pub sample_id: usize,
    pub cnv_id: Option<usize>,
    pub coords: Option<CoordColumns>,
}

impl VariantColumns {
    pub fn resolve(header: Header) -> Result<Self, InputError> {
        let sample_id = header.require(SAMPLE_ID)?;
        let cnv_id = header.find(CNV_ID);
        let coords = match cnv_id {
            Some(_) => CoordColumns::resolve(&header).ok(),
            None => Some(CoordColumns::resolve(&header)?),
        };
        Ok(Self {
            header,
            sample_id,
            cnv_id,
            coords,
        })
    }

    pub fn sample_id<'a>(&self, record: &'a csv::StringRecord) -> &'a str {
        record.get(self.sample_id).unwrap_or_default()
    }

    /// The `CNV_ID` of `record`, taken from the table or built from its
    /// coordinates.
    pub fn cnv_id(&self, record: &csv::StringRecord) -> Result<String, InputError> {
        match (self.cnv_id, &self.coords) {
            (Some(idx), _) => Ok(record.get(idx).unwrap_or_default().to_string()),
            (None, Some(coords)) => Ok(coords.key(&self.header, record)?.cnv_id()),
            (None, None) => Err(self.header.missing(CNV_ID[0])),
        }
    }
}
