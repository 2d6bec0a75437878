use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::client::ApiSession;
use crate::error::Result;
use crate::record::Record;

/// Identifier sent in place of the production id; the server assigns a
/// real one on insert.
pub const PLACEHOLDER_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Journal fields must not travel to the test environment.
const DROPPED_FIELDS: [&str; 2] = ["xfdcawkJvnumber", "xfdcawkIsjvprocesseddate"];

/// Current date as YYYY-MM-DD, local clock when the offset is known.
pub fn today_stamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let date = now.date();
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Build the submission body for one diff row: journal fields dropped,
/// placeholder id, created-on restamped.
pub fn replay_payload(record: &Record, created_on: &str) -> Result<Value> {
    let mut map: Map<String, Value> = serde_json::from_value(serde_json::to_value(record)?)?;
    for field in DROPPED_FIELDS {
        map.remove(field);
    }
    map.insert("id".into(), Value::String(PLACEHOLDER_ID.into()));
    map.insert(
        "xfdcawkCreatedon".into(),
        Value::String(created_on.into()),
    );
    Ok(Value::Object(map))
}

#[derive(Debug, Default)]
pub struct ReplaySummary {
    pub submitted: usize,
    pub failed: usize,
}

/// Submit every diff row with the session's bearer token. A failed
/// submission is logged with its payload and the loop moves on.
pub fn replay_all(session: &ApiSession, rows: &[Record]) -> Result<ReplaySummary> {
    let created_on = today_stamp();
    let mut summary = ReplaySummary::default();
    for (i, row) in rows.iter().enumerate() {
        let payload = replay_payload(row, &created_on)?;
        match session.submit(&payload) {
            Ok(echoed) => {
                let assigned = echoed.get("id").and_then(Value::as_str).unwrap_or("");
                info!(row = i + 1, id = assigned, "replayed record");
                summary.submitted += 1;
            }
            Err(err) => {
                warn!(row = i + 1, %err, payload = %payload, "replay submission failed");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}
