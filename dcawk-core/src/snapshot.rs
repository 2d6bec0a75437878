use std::path::Path;

use crate::error::{DcawkError, Result};
use crate::record::{COLUMNS, Record};

/// Write one snapshot in wire column order. The header row is written
/// even when the set is empty (the diff file can legitimately be empty).
pub fn write_csv(path: &Path, rows: &[Record]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_csv(path: &Path) -> Result<Vec<Record>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| DcawkError::Config(format!("cannot open {}: {e}", path.display())))?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Data-row count (header excluded), for the workflow's count check.
pub fn count_rows(path: &Path) -> Result<usize> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| DcawkError::Config(format!("cannot open {}: {e}", path.display())))?;
    let mut count = 0;
    for row in reader.records() {
        row?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_rows_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.csv");
        let rows = vec![
            Record {
                filename: "TOM_844_227.1X_20634.SEQ".into(),
                fiscalyear: "2324".into(),
                bankname: "BB&T".into(),
                totaldep: "0.00".into(),
                id: "73893741-cd1e-4256-a040-a94f27364ca6".into(),
                ..Default::default()
            },
            Record {
                filename: "second".into(),
                fiscalyear: "2425".into(),
                ..Default::default()
            },
        ];

        write_csv(&path, &rows).unwrap();
        let back = read_csv(&path).unwrap();
        assert_eq!(back, rows);
        assert_eq!(count_rows(&path).unwrap(), 2);
    }

    #[test]
    fn empty_set_still_gets_a_header_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diff.csv");
        write_csv(&path, &[]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), COLUMNS.join(","));
        assert!(read_csv(&path).unwrap().is_empty());
        assert_eq!(count_rows(&path).unwrap(), 0);
    }

    #[test]
    fn missing_snapshot_is_a_descriptive_error() {
        let err = read_csv(Path::new("/nonexistent/xdcawk_prod.csv")).unwrap_err();
        assert!(err.to_string().contains("xdcawk_prod.csv"));
    }
}
