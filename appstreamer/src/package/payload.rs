//! Payload archive downloads.
//!
//! A [`PayloadJob`] names one archive to materialize. Jobs are executed
//! either sequentially or in batches of scoped threads; in both cases a
//! destination that already hashes to its identifier is left untouched.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use tracing::{debug, info};

use super::checksum::{is_verified, verify_checksum};
use crate::endpoints::payload_filename;
use crate::error::{StreamerError, StreamerResult};
use crate::session::Session;

/// One payload archive to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadJob {
    /// Content hash, which is also the expected SHA-1.
    pub content_hash: String,
    /// URL to fetch (live or archival retrieval).
    pub url: String,
    /// Local path: `<output_dir>/<content_hash>.tar.xz`.
    pub dest: PathBuf,
}

impl PayloadJob {
    /// Build the job for `content_hash`, fetched live or as of `timestamp`.
    pub fn new(
        session: &Session,
        content_hash: &str,
        output_dir: &Path,
        timestamp: Option<&str>,
    ) -> Self {
        let endpoints = session.endpoints();
        Self {
            content_hash: content_hash.to_string(),
            url: endpoints.live_or_archived(&endpoints.payload_url(content_hash), timestamp),
            dest: output_dir.join(payload_filename(content_hash)),
        }
    }

    fn filename(&self) -> String {
        payload_filename(&self.content_hash)
    }
}

/// What happened to one payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadOutcome {
    /// A verified copy was already present.
    Skipped,
    /// The payload was fetched; carries the number of bytes written.
    Downloaded(u64),
}

/// Totals over a set of payload downloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Payloads fetched over the network.
    pub downloaded: usize,
    /// Payloads already present and verified.
    pub skipped: usize,
    /// Bytes written for fetched payloads.
    pub bytes: u64,
}

impl DownloadSummary {
    /// Record one outcome.
    pub fn record(&mut self, outcome: PayloadOutcome) {
        match outcome {
            PayloadOutcome::Skipped => self.skipped += 1,
            PayloadOutcome::Downloaded(bytes) => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
        }
    }

    /// Add another summary into this one.
    pub fn merge(&mut self, other: DownloadSummary) {
        self.downloaded += other.downloaded;
        self.skipped += other.skipped;
        self.bytes += other.bytes;
    }
}

/// Materialize a single payload.
///
/// Skips the request when the destination already hashes to the content
/// hash. Otherwise the archive is streamed to a `.part` sibling, optionally
/// verified, and renamed over any previous file.
///
/// # Arguments
///
/// * `session` - Session providing the HTTP client and download settings
/// * `job` - The payload to fetch
///
/// # Returns
///
/// Whether the payload was skipped or downloaded, with the bytes written.
///
/// # Errors
///
/// Returns [`StreamerError::ChecksumMismatch`] if verification is enabled and
/// the download does not hash to `job.content_hash`; the `.part` file is
/// removed. Transport and I/O failures are propagated.
pub fn fetch_payload(session: &Session, job: &PayloadJob) -> StreamerResult<PayloadOutcome> {
    if is_verified(&job.dest, &job.content_hash)? {
        info!(file = %job.filename(), "Skipping downloaded and checked package");
        return Ok(PayloadOutcome::Skipped);
    }

    info!(file = %job.filename(), "Downloading package");
    let part = part_path(&job.dest);

    let bytes = match session.http().download_to(&job.url, &part) {
        Ok(bytes) => bytes,
        Err(e) => {
            fs::remove_file(&part).ok();
            return Err(e);
        }
    };

    if session.settings().verify_checksums {
        if let Err(e) = verify_checksum(&part, &job.content_hash) {
            fs::remove_file(&part).ok();
            return Err(e);
        }
    }

    replace_file(&part, &job.dest)?;
    debug!(file = %job.filename(), bytes, "Payload written");
    Ok(PayloadOutcome::Downloaded(bytes))
}

/// Execute a batch of jobs according to the session's parallelism.
///
/// Jobs sharing a destination are collapsed to the first one, so no two
/// workers ever write the same file.
pub fn fetch_all(session: &Session, jobs: Vec<PayloadJob>) -> StreamerResult<DownloadSummary> {
    let jobs = dedupe_by_destination(jobs);
    let parallel = session.settings().parallel_downloads.max(1);
    let mut summary = DownloadSummary::default();

    if parallel == 1 || jobs.len() <= 1 {
        for job in &jobs {
            summary.record(fetch_payload(session, job)?);
        }
        return Ok(summary);
    }

    for batch in jobs.chunks(parallel) {
        let results: Vec<StreamerResult<PayloadOutcome>> = thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|job| scope.spawn(move || fetch_payload(session, job)))
                .collect();
            handles
                .into_iter()
                .map(|h| {
                    h.join().unwrap_or_else(|_| {
                        Err(StreamerError::HttpFailed {
                            url: String::new(),
                            reason: "download worker panicked".to_string(),
                        })
                    })
                })
                .collect()
        });

        for result in results {
            summary.record(result?);
        }
    }

    Ok(summary)
}

fn dedupe_by_destination(jobs: Vec<PayloadJob>) -> Vec<PayloadJob> {
    let mut seen = HashSet::new();
    jobs.into_iter()
        .filter(|job| seen.insert(job.dest.clone()))
        .collect()
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

fn replace_file(from: &Path, to: &Path) -> StreamerResult<()> {
    if to.exists() {
        fs::remove_file(to).map_err(|e| StreamerError::WriteFailed {
            path: to.to_path_buf(),
            source: e,
        })?;
    }
    fs::rename(from, to).map_err(|e| StreamerError::WriteFailed {
        path: to.to_path_buf(),
        source: e,
    })
}
