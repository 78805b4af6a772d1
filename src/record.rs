use serde::Serialize;

use crate::error::Error;

/// Transaction date, kept as the positional slices of an `MMDDYYYY` field.
/// The year stays a string: donor history compares years lexicographically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionDate {
    pub month: String,
    pub day: String,
    pub year: String,
}

impl ContributionDate {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidDate(raw.to_string()));
        }
        Ok(ContributionDate {
            month: raw[0..2].to_string(),
            day: raw[2..4].to_string(),
            year: raw[4..8].to_string(),
        })
    }
}

/// A contribution that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub committee_id: String,
    pub name: String,
    /// Always exactly five characters.
    pub zip: String,
    pub date: ContributionDate,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DonorKey {
    pub name: String,
    pub zip: String,
}

impl DonorKey {
    pub fn of(record: &Record) -> Self {
        DonorKey {
            name: record.name.clone(),
            zip: record.zip.clone(),
        }
    }
}

/// Zip and year come from the repeat contribution itself, never from donor history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub committee_id: String,
    pub zip: String,
    pub year: String,
}

impl GroupKey {
    pub fn of(record: &Record) -> Self {
        GroupKey {
            committee_id: record.committee_id.clone(),
            zip: record.zip.clone(),
            year: record.date.year.clone(),
        }
    }
}

/// One output line: `committee|zip|year|percentile|total|count`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeatDonation {
    pub committee_id: String,
    pub zip: String,
    pub year: String,
    pub percentile: i64,
    pub total: f64,
    pub count: usize,
}
