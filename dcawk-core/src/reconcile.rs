use std::collections::HashSet;

use crate::record::Record;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Prod,
    Test,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Prod => write!(f, "PROD"),
            Side::Test => write!(f, "TEST"),
        }
    }
}

/// A composite key seen more than once while building one side's key set.
/// The row is still counted as present; this is a report entry, not an error.
#[derive(Clone, Debug)]
pub struct DuplicateKey {
    pub side: Side,
    /// 1-based row number in extraction order.
    pub row: usize,
    pub key: String,
    pub filename: String,
    pub fiscalyear: String,
}

/// One production row whose key has no match in the test set.
#[derive(Clone, Debug)]
pub struct DiffEntry {
    /// 1-based row number in the production set.
    pub row: usize,
    pub key: String,
    pub record: Record,
}

#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub prod_total: usize,
    pub prod_unique: usize,
    pub test_total: usize,
    pub test_unique: usize,
    /// Production-order subsequence of rows missing from test.
    pub diff: Vec<DiffEntry>,
    pub duplicates: Vec<DuplicateKey>,
}

impl ReconcileOutcome {
    /// Naive expectation from unique key counts. Signed: test can hold
    /// keys production does not.
    pub fn expected_diff(&self) -> i64 {
        self.prod_unique as i64 - self.test_unique as i64
    }

    /// True when the physical diff length disagrees with the unique-key
    /// expectation. A data-quality signal (duplicate keys), not a defect.
    pub fn count_mismatch(&self) -> bool {
        self.diff.len() as i64 != self.expected_diff()
    }
}

fn key_set(rows: &[Record], side: Side, duplicates: &mut Vec<DuplicateKey>) -> HashSet<String> {
    let mut keys = HashSet::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let key = row.reconcile_key();
        if keys.contains(&key) {
            duplicates.push(DuplicateKey {
                side,
                row: i + 1,
                key,
                filename: row.filename.clone(),
                fiscalyear: row.fiscalyear.clone(),
            });
        } else {
            keys.insert(key);
        }
    }
    keys
}

/// One-way reconciliation: every production row whose composite key is
/// absent from the test key set lands in the diff, in production order.
/// Duplicate production rows are each tested independently.
pub fn reconcile(prod: &[Record], test: &[Record]) -> ReconcileOutcome {
    let mut duplicates = Vec::new();

    let test_keys = key_set(test, Side::Test, &mut duplicates);
    let prod_keys = key_set(prod, Side::Prod, &mut duplicates);

    let mut diff = Vec::new();
    for (i, row) in prod.iter().enumerate() {
        let key = row.reconcile_key();
        if !test_keys.contains(&key) {
            diff.push(DiffEntry {
                row: i + 1,
                key,
                record: row.clone(),
            });
        }
    }

    ReconcileOutcome {
        prod_total: prod.len(),
        prod_unique: prod_keys.len(),
        test_total: test.len(),
        test_unique: test_keys.len(),
        diff,
        duplicates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(filename: &str, fiscalyear: &str) -> Record {
        Record {
            filename: filename.into(),
            fiscalyear: fiscalyear.into(),
            ..Default::default()
        }
    }

    #[test]
    fn missing_row_lands_in_diff_and_counts_match() {
        let prod = vec![rec("f1", "24"), rec("f2", "24")];
        let test = vec![rec("f1", "24")];
        let out = reconcile(&prod, &test);

        assert_eq!(out.diff.len(), 1);
        assert_eq!(out.diff[0].key, "f2|24");
        assert_eq!(out.diff[0].row, 2);
        assert_eq!(out.expected_diff(), 1);
        assert!(!out.count_mismatch());
        assert!(out.duplicates.is_empty());
    }

    #[test]
    fn diff_is_a_prod_order_subsequence() {
        let prod = vec![rec("a", "1"), rec("b", "1"), rec("c", "1"), rec("d", "1")];
        let test = vec![rec("b", "1"), rec("d", "1")];
        let out = reconcile(&prod, &test);

        let keys: Vec<&str> = out.diff.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, ["a|1", "c|1"]);
        let rows: Vec<usize> = out.diff.iter().map(|d| d.row).collect();
        assert_eq!(rows, [1, 3]);
    }

    #[test]
    fn duplicate_prod_rows_matching_test_stay_out_of_diff() {
        let prod = vec![rec("f1", "24"), rec("f1", "24")];
        let test = vec![rec("f1", "24")];
        let out = reconcile(&prod, &test);

        assert!(out.diff.is_empty());
        assert_eq!(out.prod_total, 2);
        assert_eq!(out.prod_unique, 1);
        // 1 - 1 == 0 == len(diff): duplicates present but no mismatch here
        assert_eq!(out.expected_diff(), 0);
        assert!(!out.count_mismatch());
        assert_eq!(out.duplicates.len(), 1);
        assert_eq!(out.duplicates[0].side, Side::Prod);
        assert_eq!(out.duplicates[0].row, 2);
    }

    #[test]
    fn duplicate_prod_rows_absent_from_test_trigger_mismatch() {
        // Both physical copies of f2|24 are tested independently against
        // the test key set, so len(diff)=2 while unique math says 1.
        let prod = vec![rec("f1", "24"), rec("f2", "24"), rec("f2", "24")];
        let test = vec![rec("f1", "24")];
        let out = reconcile(&prod, &test);

        assert_eq!(out.diff.len(), 2);
        assert_eq!(out.expected_diff(), 1);
        assert!(out.count_mismatch());
    }

    #[test]
    fn keys_are_compared_after_field_level_trimming() {
        let prod = vec![rec(" X ", " 2024 ")];
        let test = vec![rec("X", "2024")];
        let out = reconcile(&prod, &test);
        assert!(out.diff.is_empty());
    }

    #[test]
    fn test_side_duplicates_are_reported_too() {
        let prod = vec![rec("f1", "24")];
        let test = vec![rec("f1", "24"), rec("f1", "24"), rec("f1", "24")];
        let out = reconcile(&prod, &test);

        let test_dups: Vec<usize> = out
            .duplicates
            .iter()
            .filter(|d| d.side == Side::Test)
            .map(|d| d.row)
            .collect();
        assert_eq!(test_dups, [2, 3]);
        assert_eq!(out.test_unique, 1);
        // 1 - 1 = 0 matches the empty diff even though test holds duplicates
        assert!(!out.count_mismatch());
    }
}
