use std::collections::{hash_map::Entry, HashMap};

use crate::{error::Error, record::GroupKey};

/// Zero-based index selected by `percentile` in a sequence of `len` amounts:
/// `ceil(percentile / 100 * len) - 1`, evaluated in f64.
/// Returns `None` when the result falls outside the sequence.
pub fn percentile_index(percentile: u32, len: usize) -> Option<usize> {
    let rank = ((f64::from(percentile) / 100.0) * len as f64).ceil() as i64 - 1;
    if rank < 0 || rank as usize >= len {
        None
    } else {
        Some(rank as usize)
    }
}

/// Round half up, reported as an integer.
fn round_half_up(amount: f64) -> i64 {
    (amount + 0.5).floor() as i64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupStats {
    pub percentile_value: i64,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct GroupAggregate {
    total: f64,
    // Arrival order, never sorted: the percentile is picked by arrival rank.
    amounts: Vec<f64>,
}

impl GroupAggregate {
    fn new(amount: f64) -> Self {
        GroupAggregate {
            total: amount,
            amounts: vec![amount],
        }
    }

    fn count(&self) -> usize {
        self.amounts.len()
    }

    fn try_append(&mut self, amount: f64, percentile: u32) -> Result<GroupStats, Error> {
        let len = self.amounts.len() + 1;
        let idx = percentile_index(percentile, len)
            .ok_or(Error::PercentileOutOfRange { percentile, len })?;
        self.amounts.push(amount);
        self.total += amount;
        Ok(GroupStats {
            percentile_value: round_half_up(self.amounts[idx]),
            total: self.total,
            count: self.count(),
        })
    }
}

#[derive(Debug, Default)]
pub struct Groups {
    groups: HashMap<GroupKey, GroupAggregate>,
}

impl Groups {
    /// Fold a repeat contribution into its group and report the running statistics.
    /// The first contribution of a group reports its own rounded amount without
    /// consulting the percentile. A percentile that selects no element leaves the
    /// group untouched.
    pub fn fold(
        &mut self,
        key: GroupKey,
        amount: f64,
        percentile: u32,
    ) -> Result<GroupStats, Error> {
        match self.groups.entry(key) {
            Entry::Vacant(entry) => {
                let group = entry.insert(GroupAggregate::new(amount));
                Ok(GroupStats {
                    percentile_value: round_half_up(amount),
                    total: group.total,
                    count: group.count(),
                })
            }
            Entry::Occupied(mut entry) => entry.get_mut().try_append(amount, percentile),
        }
    }

    /// Amounts of a group in arrival order. Inspection only, not used while streaming.
    pub fn amounts(&self, key: &GroupKey) -> Option<&[f64]> {
        self.groups.get(key).map(|g| g.amounts.as_slice())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
