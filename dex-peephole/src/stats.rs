//! Pass statistics, reported on the trace channel.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use itertools::Itertools;
use tracing::{debug, trace};

/// Counters for one run of the pass.
///
/// `run_method` returns one `Stats` per method; workers accumulate
/// their own and the caller sums them with `+=`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    /// Firings per rule name.
    rules_fired: BTreeMap<&'static str, u64>,
    /// Instructions deleted by rule firings.
    pub insns_removed: u64,
    /// Instructions synthesized by rule firings.
    pub insns_inserted: u64,
    /// Check-casts deleted by the redundant-cast remover.
    pub casts_removed: u64,
}

impl Stats {
    pub(crate) fn record(&mut self, rule: &'static str, removed: usize, inserted: usize) {
        *self.rules_fired.entry(rule).or_default() += 1;
        self.insns_removed += removed as u64;
        self.insns_inserted += inserted as u64;
    }

    /// How often the named rule fired.
    pub fn fired(&self, rule: &str) -> u64 {
        self.rules_fired.get(rule).copied().unwrap_or(0)
    }

    /// Total rule firings.
    pub fn total_fired(&self) -> u64 {
        self.rules_fired.values().sum()
    }

    /// Per-rule firing counts, keyed by rule name.
    pub fn rules_fired(&self) -> &BTreeMap<&'static str, u64> {
        &self.rules_fired
    }

    /// Emit the pass totals and per-rule counts on the trace channel.
    pub fn report(&self) {
        debug!(
            removed = self.insns_removed,
            inserted = self.insns_inserted,
            net = self.insns_inserted as i64 - self.insns_removed as i64,
            rules_fired = self.total_fired(),
            casts_removed = self.casts_removed,
            "peephole totals"
        );
        let by_count = self
            .rules_fired
            .iter()
            .sorted_by_key(|(name, count)| (core::cmp::Reverse(**count), **name));
        for (&rule, &count) in by_count {
            trace!(rule, count, "rule firings");
        }
    }
}

impl AddAssign<&Stats> for Stats {
    fn add_assign(&mut self, other: &Stats) {
        for (&rule, &count) in &other.rules_fired {
            *self.rules_fired.entry(rule).or_default() += count;
        }
        self.insns_removed += other.insns_removed;
        self.insns_inserted += other.insns_inserted;
        self.casts_removed += other.casts_removed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_counters() {
        let mut a = Stats::default();
        a.record("x", 4, 2);
        a.record("x", 4, 2);
        let mut b = Stats::default();
        b.record("y", 1, 0);
        b.casts_removed = 3;

        a += &b;
        assert_eq!(a.fired("x"), 2);
        assert_eq!(a.fired("y"), 1);
        assert_eq!(a.fired("z"), 0);
        assert_eq!(a.total_fired(), 3);
        assert_eq!(a.insns_removed, 9);
        assert_eq!(a.insns_inserted, 4);
        assert_eq!(a.casts_removed, 3);
    }
}
