use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Map, Value};

use crate::error::{DcawkError, Result};
use crate::record::Record;

pub const DEFAULT_BASE_URL: &str = "https://integrate.elluciancloud.com";
pub const RESOURCE_PATH: &str = "/api/x-xfdcawk";
pub const PAGE_SIZE: usize = 1000;

const AUTH_TIMEOUT: Duration = Duration::from_secs(30);
const COUNT_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Read seam over the remote collection. Implemented by [`ApiSession`];
/// tests substitute in-memory fakes.
pub trait RecordSource: Send + Sync {
    fn total_count(&self) -> Result<usize>;

    fn fetch_page(&self, page: usize) -> Result<Vec<Record>>;
}

/// Unauthenticated client; [`ApiClient::authenticate`] upgrades it to a
/// session holding the bearer token.
pub struct ApiClient {
    http: Client,
    base: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut base: String = base_url.into();
        while base.ends_with('/') {
            base.pop();
        }
        let http = Client::builder().build()?;
        Ok(Self { http, base })
    }

    /// Basic-credential exchange; the bearer token is the raw response
    /// body. Any failure here is fatal to the run.
    pub fn authenticate(self, api_key: &str) -> Result<ApiSession> {
        let url = format!("{}/auth", self.base);
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Basic {api_key}"))
            .header(CONTENT_TYPE, "text/plain")
            .timeout(AUTH_TIMEOUT)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| DcawkError::Auth(e.to_string()))?;
        let token = response
            .text()
            .map_err(|e| DcawkError::Auth(e.to_string()))?
            .trim()
            .to_string();
        if token.is_empty() {
            return Err(DcawkError::Auth("empty bearer token in response".into()));
        }
        Ok(ApiSession {
            http: self.http,
            base: self.base,
            token,
        })
    }
}

/// Authenticated handle for the x-xfdcawk resource.
pub struct ApiSession {
    http: Client,
    base: String,
    token: String,
}

impl ApiSession {
    fn resource_url(&self) -> String {
        format!("{}{}", self.base, RESOURCE_PATH)
    }

    /// Unfiltered GET; the collection size arrives in the x-total-count
    /// response header. Missing or malformed header is fatal.
    pub fn total_count(&self) -> Result<usize> {
        let response = self
            .http
            .get(self.resource_url())
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.token)
            .timeout(COUNT_TIMEOUT)
            .send()?
            .error_for_status()?;
        let raw = response
            .headers()
            .get("x-total-count")
            .ok_or_else(|| DcawkError::Api("missing x-total-count header".into()))?
            .to_str()
            .map_err(|e| DcawkError::Api(format!("unreadable x-total-count header: {e}")))?;
        raw.trim()
            .parse()
            .map_err(|e| DcawkError::Api(format!("invalid x-total-count value '{raw}': {e}")))
    }

    /// One page of raw records, normalized. Offset is in rows, not pages.
    pub fn fetch_page(&self, page: usize) -> Result<Vec<Record>> {
        let offset = page * PAGE_SIZE;
        let objects: Vec<Map<String, Value>> = self
            .http
            .get(self.resource_url())
            .query(&[
                ("limit", PAGE_SIZE.to_string()),
                ("offset", offset.to_string()),
            ])
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.token)
            .timeout(PAGE_TIMEOUT)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(objects.iter().map(Record::from_raw).collect())
    }

    /// POST one record payload; the server echoes the stored record with
    /// its assigned identifier.
    pub fn submit(&self, payload: &Value) -> Result<Value> {
        let echoed = self
            .http
            .post(self.resource_url())
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.token)
            .timeout(PAGE_TIMEOUT)
            .json(payload)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(echoed)
    }
}

impl RecordSource for ApiSession {
    fn total_count(&self) -> Result<usize> {
        ApiSession::total_count(self)
    }

    fn fetch_page(&self, page: usize) -> Result<Vec<Record>> {
        ApiSession::fetch_page(self, page)
    }
}
