use std::collections::{hash_map::Entry, HashMap};

use crate::record::{ContributionDate, DonorKey};

/// Outcome of observing one contribution for a donor.
/// Per-donor transitions:
/// Unseen -> Seen (FirstSeen, date stored)
/// Seen -> Seen (Rebased, stored year >= new year, date overwritten)
/// Seen -> Seen (Repeat, stored year < new year, date left pinned)
/// Years are compared as strings, not numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    FirstSeen,
    Rebased { previous_year: String },
    Repeat { previous_year: String },
}

impl Observation {
    /// Inspection helper; the analyzer matches on the variant directly.
    pub fn is_repeat(&self) -> bool {
        matches!(self, Observation::Repeat { .. })
    }
}

#[derive(Debug, Default)]
pub struct DonorHistory {
    donors: HashMap<DonorKey, ContributionDate>,
}

impl DonorHistory {
    pub fn observe(&mut self, donor: DonorKey, date: &ContributionDate) -> Observation {
        match self.donors.entry(donor) {
            Entry::Vacant(entry) => {
                entry.insert(date.clone());
                Observation::FirstSeen
            }
            Entry::Occupied(mut entry) => {
                let stored = entry.get_mut();
                let previous_year = stored.year.clone();
                if stored.year.as_str() < date.year.as_str() {
                    Observation::Repeat { previous_year }
                } else {
                    *stored = date.clone();
                    Observation::Rebased { previous_year }
                }
            }
        }
    }

    /// Date currently pinned for `donor`. Inspection only, not used while streaming.
    pub fn last_seen(&self, donor: &DonorKey) -> Option<&ContributionDate> {
        self.donors.get(donor)
    }

    pub fn len(&self) -> usize {
        self.donors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.donors.is_empty()
    }
}
