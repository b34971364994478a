use serde::{Deserialize, Serialize};

use super::{Amount, WorkerEntry, finite_or_zero};

/// Aggregate figures for a set of entries.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    /// Total revenue
    pub total: Amount,
    /// Withdrawn plus remaining across all workers
    pub for_workers: Amount,
    /// What the business keeps
    pub for_business: Amount,
    pub entry_count: usize,
    pub cf_count: usize,
}

/// Fold entries into the three summary figures.
///
/// When `include_cf` is false, CF entries don't count toward the total.
/// Non-finite values count as zero.
pub fn aggregate(entries: &[WorkerEntry], include_cf: bool) -> Summary {
    let mut grand_total = 0.0;
    let mut cf_total = 0.0;
    let mut for_workers = 0.0;
    let mut cf_count = 0;

    for entry in entries {
        let total = finite_or_zero(entry.total);
        grand_total += total;

        if entry.is_cf() {
            cf_total += total;
            cf_count += 1;
        }

        for_workers += entry.withdrawn().map(finite_or_zero).unwrap_or(0.0);
        for_workers += entry.remaining().map(finite_or_zero).unwrap_or(0.0);
    }

    let total = if include_cf {
        grand_total
    } else {
        grand_total - cf_total
    };

    Summary {
        total,
        for_workers,
        for_business: total - for_workers,
        entry_count: entries.len(),
        cf_count,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Payout, amounts_equal};

    fn standard(total: Amount, withdrawn: Amount) -> WorkerEntry {
        WorkerEntry::new(
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            "Ana".into(),
            total,
            Payout::standard(total, withdrawn, None),
        )
    }

    fn cf(total: Amount) -> WorkerEntry {
        WorkerEntry::new(
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            "Shop".into(),
            total,
            Payout::Cf,
        )
    }

    #[test]
    fn test_aggregate_empty() {
        assert_eq!(aggregate(&[], true), Summary::default());
    }

    #[test]
    fn test_aggregate_standard_entries() {
        // 100: due 25, withdrawn 10, remaining 15
        // 42: due 30, withdrawn 0, remaining -9
        let entries = vec![standard(100.0, 10.0), standard(42.0, 0.0)];
        let summary = aggregate(&entries, true);

        assert_eq!(summary.total, 142.0);
        assert_eq!(summary.for_workers, 16.0);
        assert_eq!(summary.for_business, 126.0);
        assert_eq!(summary.entry_count, 2);
        assert_eq!(summary.cf_count, 0);
    }

    #[test]
    fn test_cf_entries_count_only_toward_total() {
        let entries = vec![standard(100.0, 10.0), cf(60.0)];

        let included = aggregate(&entries, true);
        assert_eq!(included.total, 160.0);
        assert_eq!(included.for_workers, 25.0);
        assert_eq!(included.for_business, 135.0);
        assert_eq!(included.cf_count, 1);

        let excluded = aggregate(&entries, false);
        assert_eq!(excluded.total, 100.0);
        assert_eq!(excluded.for_workers, 25.0);
        assert_eq!(excluded.for_business, 75.0);
    }

    #[test]
    fn test_figures_add_up() {
        let entries = vec![
            standard(95.0, 12.5),
            standard(37.3, 4.1),
            cf(55.0),
            standard(105.0, 60.0),
        ];
        let summary = aggregate(&entries, true);
        assert!(amounts_equal(
            summary.for_workers + summary.for_business,
            summary.total
        ));
    }

    #[test]
    fn test_non_finite_values_count_as_zero() {
        let mut broken = standard(100.0, 10.0);
        broken.total = f64::NAN;
        broken.payout = Payout::Standard {
            due: 25.0,
            withdrawn: f64::INFINITY,
            remaining: 15.0,
        };
        let entries = vec![broken, standard(80.0, 0.0)];
        let summary = aggregate(&entries, true);

        assert_eq!(summary.total, 80.0);
        assert_eq!(summary.for_workers, 35.0);
        assert_eq!(summary.for_business, 45.0);
    }
}
