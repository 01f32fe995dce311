//! Archive search index queries.
//!
//! The search endpoint answers with a JSON table: the first row names the
//! columns and each following row is one capture. Every capture carries at
//! least `timestamp` (`YYYYMMDDHHMMSS`) and `original`.

use std::collections::HashMap;
use std::vec;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

use crate::error::{StreamerError, StreamerResult};
use crate::session::Session;

/// Layout of capture timestamps in the search index and retrieval URLs.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const TIMESTAMP_FIELD: &str = "timestamp";
const ORIGINAL_FIELD: &str = "original";

/// Parse an index timestamp such as `20230415120000`.
pub fn parse_timestamp(raw: &str) -> StreamerResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| StreamerError::InvalidTimestamp(raw.to_string()))
}

/// One capture of a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    timestamp: DateTime<Utc>,
    raw_timestamp: String,
    fields: HashMap<String, String>,
}

impl Snapshot {
    /// Build a snapshot from one header-zipped index row.
    pub fn from_fields(fields: HashMap<String, String>) -> StreamerResult<Self> {
        let raw_timestamp = fields
            .get(TIMESTAMP_FIELD)
            .cloned()
            .ok_or_else(|| StreamerError::InvalidTimestamp(String::new()))?;
        let timestamp = parse_timestamp(&raw_timestamp)?;
        Ok(Self {
            timestamp,
            raw_timestamp,
            fields,
        })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The timestamp exactly as the index returned it, for retrieval URLs.
    pub fn raw_timestamp(&self) -> &str {
        &self.raw_timestamp
    }

    /// The captured URL, when the index reports it.
    pub fn original_url(&self) -> Option<&str> {
        self.get(ORIGINAL_FIELD)
    }

    /// Any other column of the index row.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }
}

/// Iterator over the rows of one index response.
#[derive(Debug)]
pub struct Snapshots {
    header: Vec<String>,
    rows: vec::IntoIter<Vec<String>>,
}

impl Snapshots {
    fn from_table(mut table: Vec<Vec<String>>) -> Self {
        if table.is_empty() {
            return Self {
                header: Vec::new(),
                rows: Vec::new().into_iter(),
            };
        }
        let header = table.remove(0);
        Self {
            header,
            rows: table.into_iter(),
        }
    }
}

impl Iterator for Snapshots {
    type Item = StreamerResult<Snapshot>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        let fields = self.header.iter().cloned().zip(row).collect();
        Some(Snapshot::from_fields(fields))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

/// Client for the archive search index.
#[derive(Debug, Clone)]
pub struct SnapshotIndex {
    session: Session,
}

impl SnapshotIndex {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Query successful captures of `url`.
    ///
    /// A positive `limit` selects the earliest captures and a negative one the
    /// most recent. Each call issues a fresh query.
    ///
    /// # Arguments
    ///
    /// * `url` - Original URL whose captures are listed
    /// * `limit` - Signed capture count passed to the index
    ///
    /// # Returns
    ///
    /// An iterator over the captures in chronological order. An empty index
    /// response yields no captures.
    ///
    /// # Errors
    ///
    /// Returns an error if the index request fails or its body is not a JSON
    /// table. A row with a malformed timestamp is reported by the iterator.
    pub fn list_snapshots(&self, url: &str, limit: i64) -> StreamerResult<Snapshots> {
        let search_url = self.session.endpoints().search_url(url, limit);
        debug!(url = %search_url, "Querying archive index");
        let body = self.session.http().get(&search_url)?;

        // No captures at all comes back as an empty body
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Snapshots::from_table(Vec::new()));
        }

        let table: Vec<Vec<String>> =
            serde_json::from_slice(&body).map_err(|e| StreamerError::ParseFailed {
                url: search_url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Snapshots::from_table(table))
    }

    /// The `count` most recent captures of `url`, oldest first.
    pub fn latest(&self, url: &str, count: usize) -> StreamerResult<Snapshots> {
        let limit = i64::try_from(count).unwrap_or(i64::MAX);
        self.list_snapshots(url, -limit)
    }
}
