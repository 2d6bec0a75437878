use std::collections::HashMap;
use std::fmt::Write as _;

use crate::record::Record;
use crate::reconcile::Side;

/// One physical row contributing to a duplicated key.
#[derive(Clone, Debug)]
pub struct RowRef {
    /// 1-based row number in extraction order.
    pub row: usize,
    pub filename: String,
    pub fiscalyear: String,
}

/// A key with more than one physical row, with every contributor listed.
#[derive(Clone, Debug)]
pub struct KeyGroup {
    pub key: String,
    pub rows: Vec<RowRef>,
}

/// Frequency profile of one row set.
#[derive(Debug)]
pub struct SetProfile {
    pub side: Side,
    pub total: usize,
    pub unique: usize,
    /// Keys with count > 1, in first-encounter order.
    pub duplicates: Vec<KeyGroup>,
}

impl SetProfile {
    /// Physical rows beyond the first occurrence of each duplicated key.
    pub fn extra_rows(&self) -> usize {
        self.duplicates.iter().map(|g| g.rows.len() - 1).sum()
    }
}

/// A key present in both sets with different physical frequencies.
#[derive(Clone, Debug)]
pub struct FrequencyMismatch {
    pub key: String,
    pub prod_count: usize,
    pub test_count: usize,
}

impl FrequencyMismatch {
    pub fn delta(&self) -> i64 {
        self.prod_count as i64 - self.test_count as i64
    }
}

#[derive(Debug)]
pub struct DuplicateAnalysis {
    pub prod: SetProfile,
    pub test: SetProfile,
    pub mismatches: Vec<FrequencyMismatch>,
}

/// All keys of one set in first-encounter order, each with its rows.
fn tally(rows: &[Record]) -> Vec<KeyGroup> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(rows.len());
    let mut groups: Vec<KeyGroup> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let key = row.reconcile_key();
        let row_ref = RowRef {
            row: i + 1,
            filename: row.filename.clone(),
            fiscalyear: row.fiscalyear.clone(),
        };
        match index.get(&key) {
            Some(&at) => groups[at].rows.push(row_ref),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(KeyGroup {
                    key,
                    rows: vec![row_ref],
                });
            }
        }
    }
    groups
}

fn profile(side: Side, total: usize, groups: &[KeyGroup]) -> SetProfile {
    SetProfile {
        side,
        total,
        unique: groups.len(),
        duplicates: groups
            .iter()
            .filter(|g| g.rows.len() > 1)
            .cloned()
            .collect(),
    }
}

/// Read-only diagnostic pass over both sets. No effect on reconciliation.
pub fn analyze(prod: &[Record], test: &[Record]) -> DuplicateAnalysis {
    let prod_groups = tally(prod);
    let test_groups = tally(test);

    let test_counts: HashMap<&str, usize> = test_groups
        .iter()
        .map(|g| (g.key.as_str(), g.rows.len()))
        .collect();

    // Prod first-encounter order keeps the report stable run to run.
    let mismatches = prod_groups
        .iter()
        .filter_map(|g| {
            let test_count = *test_counts.get(g.key.as_str())?;
            (g.rows.len() != test_count).then(|| FrequencyMismatch {
                key: g.key.clone(),
                prod_count: g.rows.len(),
                test_count,
            })
        })
        .collect();

    DuplicateAnalysis {
        prod: profile(Side::Prod, prod.len(), &prod_groups),
        test: profile(Side::Test, test.len(), &test_groups),
        mismatches,
    }
}

fn render_profile(out: &mut String, p: &SetProfile) {
    let _ = writeln!(out, "=== {} DUPLICATE KEYS ===", p.side);
    let _ = writeln!(out, "{}: {} rows, {} unique keys", p.side, p.total, p.unique);
    let _ = writeln!(
        out,
        "{} duplicate keys, {} extra rows",
        p.duplicates.len(),
        p.extra_rows()
    );
    for group in &p.duplicates {
        let _ = writeln!(
            out,
            "\nkey '{}' appears {} times:",
            group.key,
            group.rows.len()
        );
        for r in &group.rows {
            let _ = writeln!(
                out,
                "  row {}: filename=\"{}\", fiscalyear=\"{}\"",
                r.row, r.filename, r.fiscalyear
            );
        }
    }
}

impl DuplicateAnalysis {
    /// Plain-text report for the duplicates file.
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_profile(&mut out, &self.prod);
        out.push('\n');
        render_profile(&mut out, &self.test);
        out.push('\n');
        let _ = writeln!(out, "=== FREQUENCY MISMATCHES ===");
        if self.mismatches.is_empty() {
            let _ = writeln!(out, "none");
        } else {
            for m in &self.mismatches {
                let _ = writeln!(
                    out,
                    "key '{}': prod={}, test={}, delta={}",
                    m.key,
                    m.prod_count,
                    m.test_count,
                    m.delta()
                );
            }
        }
        out
    }
}
