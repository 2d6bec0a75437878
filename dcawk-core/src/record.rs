use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire column order for the x-xfdcawk resource. Snapshot CSVs, replay
/// payloads and API normalization all derive from this single layout.
pub const COLUMNS: [&str; 31] = [
    "xfdcawkAltbranch",
    "xfdcawkBankacct",
    "xfdcawkBankcity",
    "xfdcawkBankname",
    "xfdcawkBranch",
    "xfdcawkCaprefund",
    "xfdcawkCreatedon",
    "xfdcawkCurrefund",
    "xfdcawkDcasubmitted",
    "xfdcawkDepaddoper",
    "xfdcawkDepdate",
    "xfdcawkDepno",
    "xfdcawkErrormessage",
    "xfdcawkErrorstatus",
    "xfdcawkFilename",
    "xfdcawkFiscalperiod",
    "xfdcawkFiscalyear",
    "xfdcawkFiscalyearendon",
    "xfdcawkFiscalyearstarton",
    "xfdcawkInstname",
    "xfdcawkIsjvprocesseddate",
    "xfdcawkIsprocessed",
    "xfdcawkIsprocesseddate",
    "xfdcawkJvnumber",
    "xfdcawkKeyeddate",
    "xfdcawkNspsubmitted",
    "xfdcawkPyrlrefund",
    "xfdcawkRecdate",
    "xfdcawkTotaldep",
    "xfdcawkTotalrev",
    "id",
];

/// One deposit-clearing workbook record. Field declaration order is the
/// emitted CSV column order and must stay aligned with [`COLUMNS`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    #[serde(rename = "xfdcawkAltbranch")]
    pub altbranch: String,
    #[serde(rename = "xfdcawkBankacct")]
    pub bankacct: String,
    #[serde(rename = "xfdcawkBankcity")]
    pub bankcity: String,
    #[serde(rename = "xfdcawkBankname")]
    pub bankname: String,
    #[serde(rename = "xfdcawkBranch")]
    pub branch: String,
    #[serde(rename = "xfdcawkCaprefund")]
    pub caprefund: String,
    #[serde(rename = "xfdcawkCreatedon")]
    pub createdon: String,
    #[serde(rename = "xfdcawkCurrefund")]
    pub currefund: String,
    #[serde(rename = "xfdcawkDcasubmitted")]
    pub dcasubmitted: String,
    #[serde(rename = "xfdcawkDepaddoper")]
    pub depaddoper: String,
    #[serde(rename = "xfdcawkDepdate")]
    pub depdate: String,
    #[serde(rename = "xfdcawkDepno")]
    pub depno: String,
    #[serde(rename = "xfdcawkErrormessage")]
    pub errormessage: String,
    #[serde(rename = "xfdcawkErrorstatus")]
    pub errorstatus: String,
    #[serde(rename = "xfdcawkFilename")]
    pub filename: String,
    #[serde(rename = "xfdcawkFiscalperiod")]
    pub fiscalperiod: String,
    #[serde(rename = "xfdcawkFiscalyear")]
    pub fiscalyear: String,
    #[serde(rename = "xfdcawkFiscalyearendon")]
    pub fiscalyearendon: String,
    #[serde(rename = "xfdcawkFiscalyearstarton")]
    pub fiscalyearstarton: String,
    #[serde(rename = "xfdcawkInstname")]
    pub instname: String,
    #[serde(rename = "xfdcawkIsjvprocesseddate")]
    pub isjvprocesseddate: String,
    #[serde(rename = "xfdcawkIsprocessed")]
    pub isprocessed: String,
    #[serde(rename = "xfdcawkIsprocesseddate")]
    pub isprocesseddate: String,
    #[serde(rename = "xfdcawkJvnumber")]
    pub jvnumber: String,
    #[serde(rename = "xfdcawkKeyeddate")]
    pub keyeddate: String,
    #[serde(rename = "xfdcawkNspsubmitted")]
    pub nspsubmitted: String,
    #[serde(rename = "xfdcawkPyrlrefund")]
    pub pyrlrefund: String,
    #[serde(rename = "xfdcawkRecdate")]
    pub recdate: String,
    #[serde(rename = "xfdcawkTotaldep")]
    pub totaldep: String,
    #[serde(rename = "xfdcawkTotalrev")]
    pub totalrev: String,
    pub id: String,
}

/// Total field accessor: missing and null come back as "", other scalars
/// stringify. Never fails on a malformed record.
fn text_field(raw: &Map<String, Value>, name: &str) -> String {
    match raw.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

impl Record {
    /// Normalize one raw API object into a fixed-width row.
    pub fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            altbranch: text_field(raw, "xfdcawkAltbranch"),
            bankacct: text_field(raw, "xfdcawkBankacct"),
            bankcity: text_field(raw, "xfdcawkBankcity"),
            bankname: text_field(raw, "xfdcawkBankname"),
            branch: text_field(raw, "xfdcawkBranch"),
            caprefund: text_field(raw, "xfdcawkCaprefund"),
            createdon: text_field(raw, "xfdcawkCreatedon"),
            currefund: text_field(raw, "xfdcawkCurrefund"),
            dcasubmitted: text_field(raw, "xfdcawkDcasubmitted"),
            depaddoper: text_field(raw, "xfdcawkDepaddoper"),
            depdate: text_field(raw, "xfdcawkDepdate"),
            depno: text_field(raw, "xfdcawkDepno"),
            errormessage: text_field(raw, "xfdcawkErrormessage"),
            errorstatus: text_field(raw, "xfdcawkErrorstatus"),
            filename: text_field(raw, "xfdcawkFilename"),
            fiscalperiod: text_field(raw, "xfdcawkFiscalperiod"),
            fiscalyear: text_field(raw, "xfdcawkFiscalyear"),
            fiscalyearendon: text_field(raw, "xfdcawkFiscalyearendon"),
            fiscalyearstarton: text_field(raw, "xfdcawkFiscalyearstarton"),
            instname: text_field(raw, "xfdcawkInstname"),
            isjvprocesseddate: text_field(raw, "xfdcawkIsjvprocesseddate"),
            isprocessed: text_field(raw, "xfdcawkIsprocessed"),
            isprocesseddate: text_field(raw, "xfdcawkIsprocesseddate"),
            jvnumber: text_field(raw, "xfdcawkJvnumber"),
            keyeddate: text_field(raw, "xfdcawkKeyeddate"),
            nspsubmitted: text_field(raw, "xfdcawkNspsubmitted"),
            pyrlrefund: text_field(raw, "xfdcawkPyrlrefund"),
            recdate: text_field(raw, "xfdcawkRecdate"),
            totaldep: text_field(raw, "xfdcawkTotaldep"),
            totalrev: text_field(raw, "xfdcawkTotalrev"),
            id: text_field(raw, "id"),
        }
    }

    /// Composite identity for reconciliation: filename and fiscal year,
    /// each trimmed independently, joined with '|'. Empty fields stay in
    /// the key as empty strings; uniqueness is not guaranteed.
    pub fn reconcile_key(&self) -> String {
        format!("{}|{}", self.filename.trim(), self.fiscalyear.trim())
    }
}
