#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod extract;
pub mod reconcile;
pub mod record;
pub mod replay;
pub mod snapshot;

// Re-exports: stable API surface
pub use client::{ApiClient, ApiSession, DEFAULT_BASE_URL, PAGE_SIZE, RecordSource};
pub use config::{ApiConfig, Environment, resolve_api_key};
pub use duplicates::{DuplicateAnalysis, analyze};
pub use error::{DcawkError, Result};
pub use extract::{FetchSummary, fetch_all};
pub use reconcile::{ReconcileOutcome, reconcile};
pub use record::Record;
pub use replay::{PLACEHOLDER_ID, ReplaySummary, replay_all};
